//! Reporting-period selection state for the dashboard pages.
//!
//! Presets emit immediately. Custom ranges go through [`RangePicker`], which
//! only produces a value once both ends are set and never lets `to` precede
//! `from`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::period::{PeriodSelection, PeriodToken};

const EMPTY_PICKER_LABEL: &str = "Pick date range";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RangePicker {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl RangePicker {
    pub fn from_selection(selection: &PeriodSelection) -> Self {
        match selection {
            PeriodSelection::Custom { from, to } => Self {
                from: Some(*from),
                to: Some(*to),
            },
            PeriodSelection::Preset { .. } => Self::default(),
        }
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn is_complete(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Applies one click on the calendar and returns the completed range,
    /// if this click completed one.
    ///
    /// - no start yet, or a complete range already shown: start over at `day`
    /// - `day` before the pending start: the start moves to `day`
    /// - otherwise `day` closes the range
    pub fn pick(&mut self, day: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match (self.from, self.to) {
            (Some(from), None) if day >= from => {
                self.to = Some(day);
                Some((from, day))
            }
            (Some(_), None) => {
                self.from = Some(day);
                None
            }
            _ => {
                self.from = Some(day);
                self.to = None;
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.from = None;
        self.to = None;
    }

    pub fn label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                format!("{} - {}", from.format("%b %-d"), to.format("%b %-d, %Y"))
            }
            _ => EMPTY_PICKER_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeriodSelector {
    value: PeriodSelection,
    picker: RangePicker,
}

impl PeriodSelector {
    pub fn new(initial: PeriodSelection) -> Self {
        Self {
            value: initial,
            picker: RangePicker::from_selection(&initial),
        }
    }

    /// Last emitted selection.
    pub fn value(&self) -> PeriodSelection {
        self.value
    }

    pub fn picker(&self) -> &RangePicker {
        &self.picker
    }

    pub fn is_active_preset(&self, token: PeriodToken) -> bool {
        self.value == PeriodSelection::Preset { token }
    }

    pub fn select_preset(&mut self, token: PeriodToken) -> PeriodSelection {
        self.value = PeriodSelection::preset(token);
        debug!(target: "app::period", token = token.as_str(), "preset selected");
        self.value
    }

    /// Forwards a calendar click to the picker. Emits only when the click
    /// completes the range; a partial pick keeps the previously emitted value.
    pub fn pick_date(&mut self, day: NaiveDate) -> Option<PeriodSelection> {
        let (from, to) = self.picker.pick(day)?;
        self.value = PeriodSelection::custom(from, to);
        debug!(target: "app::period", %from, %to, "custom range selected");
        Some(self.value)
    }

    pub fn picker_label(&self) -> String {
        self.picker.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn earlier_click_moves_the_pending_start() {
        let mut picker = RangePicker::default();
        assert_eq!(picker.pick(day(3, 10)), None);
        assert_eq!(picker.pick(day(3, 3)), None);
        assert_eq!(picker.from(), Some(day(3, 3)));
        assert_eq!(picker.pick(day(4, 9)), Some((day(3, 3), day(4, 9))));
    }

    #[test]
    fn same_day_closes_a_single_day_range() {
        let mut picker = RangePicker::default();
        picker.pick(day(5, 1));
        assert_eq!(picker.pick(day(5, 1)), Some((day(5, 1), day(5, 1))));
    }

    #[test]
    fn label_reflects_completed_range() {
        let mut picker = RangePicker::default();
        assert_eq!(picker.label(), "Pick date range");
        picker.pick(day(3, 3));
        assert_eq!(picker.label(), "Pick date range");
        picker.pick(day(4, 9));
        assert_eq!(picker.label(), "Mar 3 - Apr 9, 2025");
    }

    #[test]
    fn preset_selection_marks_active_token() {
        let mut selector = PeriodSelector::default();
        selector.select_preset(PeriodToken::SixMonths);
        assert!(selector.is_active_preset(PeriodToken::SixMonths));
        assert!(!selector.is_active_preset(PeriodToken::OneYear));
    }
}
