use serde::{Deserialize, Serialize};

use crate::models::gauge::ScoreBand;

pub const DEMO_TOTAL_STEPS: u8 = 4;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DemoApplicant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub income: String,
    #[serde(default)]
    pub employment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DemoState {
    pub step: u8,
    pub progress_percent: u8,
    pub applicant: DemoApplicant,
    pub score: Option<i32>,
    pub category: Option<ScoreBand>,
}
