//! Derived, read-only views over the working state: submission readiness and
//! progress counts. Nothing here can invalidate the engine.

use serde::Serialize;

use crate::model::{DeliveryGroup, GroupKey};
use crate::status::WorkingStatus;

/// Which selected groups block submission, and why.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub selected: usize,
    /// Selected groups whose quantities don't validate.
    pub invalid: Vec<GroupKey>,
    /// Selected groups with issue buckets filled but no issue notes.
    pub missing_notes: Vec<GroupKey>,
    pub can_submit: bool,
}

pub fn compute_validation(groups: &[DeliveryGroup], statuses: &[WorkingStatus]) -> ValidationReport {
    let mut selected = 0;
    let mut invalid = Vec::new();
    let mut missing_notes = Vec::new();

    for (group, status) in groups.iter().zip(statuses) {
        if !status.selected {
            continue;
        }
        selected += 1;
        if !status.is_valid {
            invalid.push(group.key.clone());
        }
        if status.missing_notes() {
            missing_notes.push(group.key.clone());
        }
    }

    let can_submit =
        selected > 0 && statuses.iter().all(|s| !s.selected || s.ready_for_submit());
    ValidationReport {
        selected,
        invalid,
        missing_notes,
        can_submit,
    }
}

/// Progress counters for display.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub groups: usize,
    pub selected: usize,
    pub valid: usize,
    pub with_issues: usize,
    pub fully_accounted: usize,
    pub percent_accounted: u8,
}

pub fn compute_progress(statuses: &[WorkingStatus]) -> Progress {
    let groups = statuses.len();
    let selected = statuses.iter().filter(|s| s.selected).count();
    let valid = statuses.iter().filter(|s| s.selected && s.is_valid).count();
    let with_issues = statuses.iter().filter(|s| s.has_issues).count();
    let fully_accounted = statuses.iter().filter(|s| s.is_fully_accounted).count();
    let percent_accounted = if groups == 0 {
        0
    } else {
        (fully_accounted * 100 / groups) as u8
    };

    Progress {
        groups,
        selected,
        valid,
        with_issues,
        fully_accounted,
        percent_accounted,
    }
}
