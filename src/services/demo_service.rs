use rand::Rng;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::demo::{DemoApplicant, DemoState, DEMO_TOTAL_STEPS};
use crate::models::gauge::ScoreBand;

const DEMO_SCORE_MIN: i32 = 600;
const DEMO_SCORE_MAX_EXCLUSIVE: i32 = 800;
const CONSENT_STEP: u8 = 3;

/// Four-step public walkthrough that ends in a simulated score. Nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct DemoWizard {
    step: u8,
    applicant: DemoApplicant,
    score: Option<i32>,
}

impl Default for DemoWizard {
    fn default() -> Self {
        Self {
            step: 1,
            applicant: DemoApplicant::default(),
            score: None,
        }
    }
}

impl DemoWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn update_applicant(&mut self, applicant: DemoApplicant) {
        self.applicant = applicant;
    }

    /// Moves forward through the form steps; stops at the consent step.
    pub fn next(&mut self) -> u8 {
        if self.step < CONSENT_STEP {
            self.step += 1;
        }
        self.step
    }

    pub fn generate_score(&mut self) -> AppResult<i32> {
        self.generate_score_with(&mut rand::thread_rng())
    }

    pub fn generate_score_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AppResult<i32> {
        if self.step < CONSENT_STEP {
            return Err(AppError::validation(
                "complete the previous steps before generating a score",
            ));
        }

        let score = rng.gen_range(DEMO_SCORE_MIN..DEMO_SCORE_MAX_EXCLUSIVE);
        self.score = Some(score);
        self.step = DEMO_TOTAL_STEPS;
        info!(target: "app::demo", score, "demo score generated");
        Ok(score)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn state(&self) -> DemoState {
        DemoState {
            step: self.step,
            progress_percent: progress_percent(self.step),
            applicant: self.applicant.clone(),
            score: self.score,
            category: self.score.map(ScoreBand::for_score),
        }
    }
}

pub fn progress_percent(step: u8) -> u8 {
    let clamped = step.min(DEMO_TOTAL_STEPS);
    (f64::from(clamped) / f64::from(DEMO_TOTAL_STEPS) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn next_stops_at_consent_step() {
        let mut wizard = DemoWizard::new();
        assert_eq!(wizard.next(), 2);
        assert_eq!(wizard.next(), 3);
        assert_eq!(wizard.next(), 3);
        assert_eq!(wizard.state().progress_percent, 75);
    }

    #[test]
    fn score_requires_consent_step() {
        let mut wizard = DemoWizard::new();
        assert!(wizard.generate_score().is_err());
        assert_eq!(wizard.step(), 1);
    }

    #[test]
    fn generated_scores_stay_in_demo_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let mut wizard = DemoWizard::new();
            wizard.next();
            wizard.next();
            let score = wizard.generate_score_with(&mut rng).unwrap();
            assert!((600..800).contains(&score));
            let state = wizard.state();
            assert_eq!(state.step, 4);
            assert_eq!(state.progress_percent, 100);
            assert_ne!(state.category, Some(ScoreBand::Excellent));
        }
    }
}
