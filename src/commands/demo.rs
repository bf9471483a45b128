use std::sync::{Arc, Mutex};

use crate::models::demo::{DemoApplicant, DemoState};
use crate::services::demo_service::DemoWizard;

use super::CommandResult;

/// The public demo page. Runs without a session and keeps nothing.
#[derive(Clone, Default)]
pub struct DemoSession {
    wizard: Arc<Mutex<DemoWizard>>,
}

impl DemoSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_wizard<R>(&self, f: impl FnOnce(&mut DemoWizard) -> R) -> R {
        let mut guard = self
            .wizard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

pub fn demo_state(demo: &DemoSession) -> DemoState {
    demo.with_wizard(|wizard| wizard.state())
}

pub fn demo_update_applicant(demo: &DemoSession, applicant: DemoApplicant) -> DemoState {
    demo.with_wizard(|wizard| {
        wizard.update_applicant(applicant);
        wizard.state()
    })
}

pub fn demo_next(demo: &DemoSession) -> DemoState {
    demo.with_wizard(|wizard| {
        wizard.next();
        wizard.state()
    })
}

pub fn demo_generate_score(demo: &DemoSession) -> CommandResult<DemoState> {
    demo.with_wizard(|wizard| -> CommandResult<DemoState> {
        wizard.generate_score()?;
        Ok(wizard.state())
    })
}

pub fn demo_reset(demo: &DemoSession) -> DemoState {
    demo.with_wizard(|wizard| {
        wizard.reset();
        wizard.state()
    })
}
