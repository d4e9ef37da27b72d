//! One operator-driven reconciliation pass over a purchase order.
//!
//! The session owns all working state exclusively. Lifecycle is two-phase:
//! `open` aggregates line items and leaves the session `Loading`; feeding the
//! issue-history fetch result into `resolve_history` moves it to `Ready`,
//! after which every operation is synchronous. Dropping the session without
//! submitting discards everything — no partial writes ever happen, because
//! durable state is only touched through the change-set built here and
//! handed to the external system in one call.

use chrono::{DateTime, Utc};

use crate::aggregate::group_line_items;
use crate::error::ReceivingError;
use crate::history::apply_history;
use crate::model::{ChangeSet, DeliveryGroup, GroupKey, IssueRecord, LineItem};
use crate::project;
use crate::status::{apply, Bucket, Edit, WorkingStatus};
use crate::summary::{compute_progress, compute_validation, Progress, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the issue-history fetch result.
    Loading,
    Ready,
}

pub struct ReconcileSession {
    order_id: String,
    phase: Phase,
    groups: Vec<DeliveryGroup>,
    statuses: Vec<WorkingStatus>,
    general_notes: Option<String>,
}

impl ReconcileSession {
    /// Aggregate the order's line items and start a session in `Loading`.
    pub fn open(order_id: impl Into<String>, line_items: Vec<LineItem>) -> Self {
        let groups = group_line_items(&line_items);
        let statuses = groups.iter().map(|g| WorkingStatus::seed(g.remaining)).collect();
        Self {
            order_id: order_id.into(),
            phase: Phase::Loading,
            groups,
            statuses,
            general_notes: None,
        }
    }

    /// Feed in the issue-history fetch result and move to `Ready`.
    ///
    /// A fetch failure falls back to empty history: prior issues count as 0
    /// and `remaining = ordered - already_received`. Partial information is
    /// preferable to blocking the operator.
    pub fn resolve_history<E>(
        &mut self,
        history: Result<Vec<IssueRecord>, E>,
    ) -> Result<(), ReceivingError> {
        if self.phase == Phase::Ready {
            return Err(ReceivingError::AlreadyResolved);
        }
        apply_history(&mut self.groups, history.unwrap_or_default());
        // Buckets are untouched in Loading, so re-seeding loses nothing.
        self.statuses = self.groups.iter().map(|g| WorkingStatus::seed(g.remaining)).collect();
        self.phase = Phase::Ready;
        Ok(())
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn groups(&self) -> &[DeliveryGroup] {
        &self.groups
    }

    pub fn statuses(&self) -> &[WorkingStatus] {
        &self.statuses
    }

    pub fn group(&self, key: &GroupKey) -> Option<&DeliveryGroup> {
        self.groups.iter().find(|g| &g.key == key)
    }

    pub fn status(&self, key: &GroupKey) -> Option<&WorkingStatus> {
        let idx = self.groups.iter().position(|g| &g.key == key)?;
        self.statuses.get(idx)
    }

    fn ensure_ready(&self) -> Result<(), ReceivingError> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Loading => Err(ReceivingError::NotReady),
        }
    }

    fn index_of(&self, key: &GroupKey) -> Result<usize, ReceivingError> {
        self.groups
            .iter()
            .position(|g| &g.key == key)
            .ok_or_else(|| ReceivingError::UnknownGroup(key.to_string()))
    }

    fn edit(&mut self, key: &GroupKey, edit: &Edit) -> Result<(), ReceivingError> {
        self.ensure_ready()?;
        let idx = self.index_of(key)?;
        self.statuses[idx] = apply(&self.statuses[idx], edit, self.groups[idx].remaining);
        Ok(())
    }

    /// Flip selection. Selecting a fully-accounted group is rejected — there
    /// is nothing left to account for. Deselecting preserves working values.
    pub fn toggle_select(&mut self, key: &GroupKey) -> Result<(), ReceivingError> {
        self.ensure_ready()?;
        let idx = self.index_of(key)?;
        if self.statuses[idx].selected {
            self.statuses[idx] = apply(&self.statuses[idx], &Edit::Deselect, self.groups[idx].remaining);
        } else {
            if self.groups[idx].remaining == 0 {
                return Err(ReceivingError::NothingRemaining(key.to_string()));
            }
            self.statuses[idx] = apply(&self.statuses[idx], &Edit::Select, self.groups[idx].remaining);
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, key: &GroupKey, bucket: Bucket, qty: u32) -> Result<(), ReceivingError> {
        self.edit(key, &Edit::Set(bucket, qty))
    }

    pub fn quick_fill(&mut self, key: &GroupKey, bucket: Bucket) -> Result<(), ReceivingError> {
        self.edit(key, &Edit::QuickFill(bucket))
    }

    pub fn set_issue_notes(&mut self, key: &GroupKey, notes: impl Into<String>) -> Result<(), ReceivingError> {
        self.edit(key, &Edit::Notes(notes.into()))
    }

    pub fn set_general_notes(&mut self, notes: Option<String>) {
        self.general_notes = notes;
    }

    pub fn validation(&self) -> ValidationReport {
        compute_validation(&self.groups, &self.statuses)
    }

    pub fn can_submit(&self) -> bool {
        self.phase == Phase::Ready && self.validation().can_submit
    }

    pub fn progress(&self) -> Progress {
        compute_progress(&self.statuses)
    }

    /// Build the submission change-set. Read-only: a rejected submission
    /// leaves the session exactly as it was, ready for resubmission.
    pub fn build_change_set(&self, received_at: DateTime<Utc>) -> Result<ChangeSet, ReceivingError> {
        self.ensure_ready()?;
        let report = self.validation();
        if !report.can_submit {
            return Err(ReceivingError::NotSubmittable(format!(
                "{} selected, {} invalid, {} missing notes",
                report.selected,
                report.invalid.len(),
                report.missing_notes.len()
            )));
        }
        Ok(project::build_change_set(
            &self.groups,
            &self.statuses,
            self.general_notes.clone(),
            received_at,
        ))
    }
}
