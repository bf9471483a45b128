//! Half-dial gauge geometry for the credit score widget.
//!
//! Angles are degrees measured from the horizontal-left end of the dial
//! (0°) over the top to the right end (180°). Coordinates target a
//! 200×120 SVG viewBox with the dial centred at (100, 100).

use crate::models::gauge::{
    BandArc, GaugeGeometry, Point, ScoreBand, ScoreGaugeInput, DEFAULT_MAX_SCORE,
};

const DIAL_SWEEP_DEGREES: f64 = 180.0;
const CENTER: Point = Point { x: 100.0, y: 100.0 };
const ARC_RADIUS: f64 = 90.0;
const LABEL_RADIUS: f64 = 75.0;
const TICK_RADIUS: f64 = 58.0;
const NEEDLE_LENGTH: f64 = 80.0;

/// Needle angle for `score`. Scores outside the scale are clamped first so
/// the needle never leaves the dial. A degenerate scale pins the needle at 0°.
pub fn needle_angle(score: i32, min_score: i32, max_score: i32) -> f64 {
    if max_score <= min_score {
        return 0.0;
    }
    let clamped = score.clamp(min_score, max_score);
    scale_angle(clamped, min_score, max_score)
}

/// Angle of an arbitrary scale value without clamping; band edges use this.
pub fn scale_angle(value: i32, min_score: i32, max_score: i32) -> f64 {
    if max_score <= min_score {
        return 0.0;
    }
    let span = f64::from(max_score) - f64::from(min_score);
    (f64::from(value) - f64::from(min_score)) / span * DIAL_SWEEP_DEGREES
}

/// `(start, end)` angles of a band on the given scale.
pub fn band_angles(band: ScoreBand, min_score: i32, max_score: i32) -> (f64, f64) {
    let (low, high) = band.bounds();
    (
        scale_angle(low, min_score, max_score),
        scale_angle(high, min_score, max_score),
    )
}

pub fn point_on_dial(angle_degrees: f64, radius: f64) -> Point {
    let radians = angle_degrees.to_radians();
    Point {
        x: CENTER.x - radius * radians.cos(),
        y: CENTER.y - radius * radians.sin(),
    }
}

/// Share of the 850 ceiling, shown as "better than N%".
pub fn percentile(score: i32) -> i32 {
    (f64::from(score) / f64::from(DEFAULT_MAX_SCORE) * 100.0).round() as i32
}

pub fn render(input: &ScoreGaugeInput) -> GaugeGeometry {
    let ScoreGaugeInput {
        score,
        min_score,
        max_score,
    } = *input;

    let needle = needle_angle(score, min_score, max_score);
    let clamped_score = if max_score > min_score {
        score.clamp(min_score, max_score)
    } else {
        score
    };

    let bands = ScoreBand::ALL
        .iter()
        .map(|band| band_arc(*band, min_score, max_score))
        .collect();

    GaugeGeometry {
        score,
        min_score,
        max_score,
        clamped_score,
        category: ScoreBand::for_score(score),
        needle_angle: needle,
        needle_tip: point_on_dial(needle, NEEDLE_LENGTH),
        bands,
        max_tick_anchor: point_on_dial(DIAL_SWEEP_DEGREES, TICK_RADIUS),
    }
}

fn band_arc(band: ScoreBand, min_score: i32, max_score: i32) -> BandArc {
    let (low, high) = band.bounds();
    let (start_angle, end_angle) = band_angles(band, min_score, max_score);
    let start = point_on_dial(start_angle, ARC_RADIUS);
    let end = point_on_dial(end_angle, ARC_RADIUS);
    let large_arc = (end_angle - start_angle).abs() > 180.0;

    let midpoint = (f64::from(low) + f64::from(high)) / 2.0;
    let mid_angle = if max_score > min_score {
        (midpoint - f64::from(min_score)) / (f64::from(max_score) - f64::from(min_score))
            * DIAL_SWEEP_DEGREES
    } else {
        0.0
    };

    BandArc {
        band,
        label: band.label().to_string(),
        color: band.color().to_string(),
        start_angle,
        end_angle,
        start,
        end,
        large_arc,
        path: format!(
            "M{:.2} {:.2} A{r} {r} 0 {} 1 {:.2} {:.2}",
            start.x,
            start.y,
            u8::from(large_arc),
            end.x,
            end.y,
            r = ARC_RADIUS
        ),
        label_anchor: point_on_dial(mid_angle, LABEL_RADIUS),
        tick_value: low,
        tick_anchor: point_on_dial(start_angle, TICK_RADIUS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn needle_hits_both_ends_of_the_dial() {
        assert!((needle_angle(300, 300, 850) - 0.0).abs() < EPSILON);
        assert!((needle_angle(850, 300, 850) - 180.0).abs() < EPSILON);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        assert_eq!(needle_angle(900, 300, 850), needle_angle(850, 300, 850));
        assert_eq!(needle_angle(120, 300, 850), needle_angle(300, 300, 850));
    }

    #[test]
    fn degenerate_scale_does_not_divide_by_zero() {
        assert_eq!(needle_angle(500, 500, 500), 0.0);
        assert_eq!(scale_angle(700, 850, 300), 0.0);
    }

    #[test]
    fn needle_tip_points_left_at_minimum_and_up_at_midpoint() {
        let left = point_on_dial(0.0, NEEDLE_LENGTH);
        assert!((left.x - 20.0).abs() < EPSILON);
        assert!((left.y - 100.0).abs() < EPSILON);

        let top = point_on_dial(90.0, NEEDLE_LENGTH);
        assert!((top.x - 100.0).abs() < 1e-6);
        assert!((top.y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn render_produces_five_arcs_without_large_arc_flag() {
        let geometry = render(&ScoreGaugeInput::new(742));
        assert_eq!(geometry.bands.len(), 5);
        assert!(geometry.bands.iter().all(|arc| !arc.large_arc));
        assert_eq!(geometry.category, ScoreBand::VeryGood);
        assert_eq!(geometry.bands[0].tick_value, 300);
        assert!(geometry.bands[0].path.starts_with("M10.00 100.00 A90 90 0 0 1"));
    }

    #[test]
    fn percentile_rounds_against_ceiling() {
        assert_eq!(percentile(742), 87);
        assert_eq!(percentile(850), 100);
    }
}
