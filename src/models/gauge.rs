use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_SCORE: i32 = 300;
pub const DEFAULT_MAX_SCORE: i32 = 850;

fn default_min_score() -> i32 {
    DEFAULT_MIN_SCORE
}

fn default_max_score() -> i32 {
    DEFAULT_MAX_SCORE
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreGaugeInput {
    pub score: i32,
    #[serde(default = "default_min_score")]
    pub min_score: i32,
    #[serde(default = "default_max_score")]
    pub max_score: i32,
}

impl ScoreGaugeInput {
    pub fn new(score: i32) -> Self {
        Self {
            score,
            min_score: DEFAULT_MIN_SCORE,
            max_score: DEFAULT_MAX_SCORE,
        }
    }
}

/// Fixed risk bands of the 300..=850 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScoreBand {
    #[serde(rename = "POOR")]
    Poor,
    #[serde(rename = "FAIR")]
    Fair,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "VERY GOOD")]
    VeryGood,
    #[serde(rename = "EXCELLENT")]
    Excellent,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 5] = [
        ScoreBand::Poor,
        ScoreBand::Fair,
        ScoreBand::Good,
        ScoreBand::VeryGood,
        ScoreBand::Excellent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Poor => "POOR",
            ScoreBand::Fair => "FAIR",
            ScoreBand::Good => "GOOD",
            ScoreBand::VeryGood => "VERY GOOD",
            ScoreBand::Excellent => "EXCELLENT",
        }
    }

    /// Inclusive `(min, max)` of the band.
    pub fn bounds(&self) -> (i32, i32) {
        match self {
            ScoreBand::Poor => (300, 579),
            ScoreBand::Fair => (580, 669),
            ScoreBand::Good => (670, 739),
            ScoreBand::VeryGood => (740, 799),
            ScoreBand::Excellent => (800, 850),
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ScoreBand::Poor => "#F97316",
            ScoreBand::Fair => "#FB923C",
            ScoreBand::Good => "#F59E42",
            ScoreBand::VeryGood => "#EF7E3A",
            ScoreBand::Excellent => "#EA580C",
        }
    }

    pub fn for_score(score: i32) -> Self {
        match score {
            s if s >= 800 => ScoreBand::Excellent,
            s if s >= 740 => ScoreBand::VeryGood,
            s if s >= 670 => ScoreBand::Good,
            s if s >= 580 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BandArc {
    pub band: ScoreBand,
    pub label: String,
    pub color: String,
    pub start_angle: f64,
    pub end_angle: f64,
    pub start: Point,
    pub end: Point,
    pub large_arc: bool,
    /// SVG path data for the arc stroke.
    pub path: String,
    pub label_anchor: Point,
    pub tick_value: i32,
    pub tick_anchor: Point,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GaugeGeometry {
    pub score: i32,
    pub min_score: i32,
    pub max_score: i32,
    pub clamped_score: i32,
    pub category: ScoreBand,
    pub needle_angle: f64,
    pub needle_tip: Point,
    pub bands: Vec<BandArc>,
    pub max_tick_anchor: Point,
}
