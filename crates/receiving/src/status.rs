//! Per-group working state and the pure edit reducer.
//!
//! All derived flags are recomputed on every edit; nothing here performs IO
//! or touches other groups, so the whole state machine is unit-testable with
//! plain values.

use serde::Serialize;

/// The five new-quantity buckets an operator can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    ReceivedGood,
    Damaged,
    NeverArrived,
    WrongItem,
    Other,
}

impl std::str::FromStr for Bucket {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "received_good" => Ok(Self::ReceivedGood),
            "damaged" => Ok(Self::Damaged),
            "never_arrived" => Ok(Self::NeverArrived),
            "wrong_item" => Ok(Self::WrongItem),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

/// One operator input against a single group.
#[derive(Debug, Clone)]
pub enum Edit {
    Select,
    Deselect,
    Set(Bucket, u32),
    /// Toggle: fills the target bucket with `remaining` and zeroes the rest,
    /// or resets all buckets when the target already holds exactly that.
    QuickFill(Bucket),
    Notes(String),
}

/// Mutable per-group state during a session. Created at session open,
/// discarded at close; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct WorkingStatus {
    pub received_good: u32,
    pub damaged: u32,
    pub never_arrived: u32,
    pub wrong_item: u32,
    pub other: u32,
    pub issue_notes: String,
    pub selected: bool,

    // Derived — recomputed by the reducer, never set directly.
    pub total_accounted: u32,
    pub has_issues: bool,
    pub is_over_delivery: bool,
    pub over_delivery_amount: u32,
    pub is_valid: bool,
    /// True when `remaining` was already 0 at session start.
    pub is_fully_accounted: bool,
}

impl WorkingStatus {
    /// Fresh status for a group with the given remaining quantity.
    pub fn seed(remaining: u32) -> Self {
        Self {
            received_good: 0,
            damaged: 0,
            never_arrived: 0,
            wrong_item: 0,
            other: 0,
            issue_notes: String::new(),
            selected: false,
            total_accounted: 0,
            has_issues: false,
            is_over_delivery: false,
            over_delivery_amount: 0,
            is_valid: false,
            is_fully_accounted: remaining == 0,
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::ReceivedGood => self.received_good,
            Bucket::Damaged => self.damaged,
            Bucket::NeverArrived => self.never_arrived,
            Bucket::WrongItem => self.wrong_item,
            Bucket::Other => self.other,
        }
    }

    fn set_bucket(&mut self, bucket: Bucket, qty: u32) {
        match bucket {
            Bucket::ReceivedGood => self.received_good = qty,
            Bucket::Damaged => self.damaged = qty,
            Bucket::NeverArrived => self.never_arrived = qty,
            Bucket::WrongItem => self.wrong_item = qty,
            Bucket::Other => self.other = qty,
        }
    }

    fn zero_buckets(&mut self) {
        self.received_good = 0;
        self.damaged = 0;
        self.never_arrived = 0;
        self.wrong_item = 0;
        self.other = 0;
    }

    /// Sum of the four issue buckets (everything except received-good).
    /// Saturating: an absurd operator entry must stay absurd rather than
    /// wrap back into the valid range.
    pub fn issue_total(&self) -> u32 {
        self.damaged
            .saturating_add(self.never_arrived)
            .saturating_add(self.wrong_item)
            .saturating_add(self.other)
    }

    /// Issue buckets filled but no issue notes entered.
    pub fn missing_notes(&self) -> bool {
        self.has_issues && self.issue_notes.trim().is_empty()
    }

    /// Whether this group counts toward submission: selected, valid, and
    /// issue notes present whenever any issue bucket is filled.
    pub fn ready_for_submit(&self) -> bool {
        self.selected && self.is_valid && !self.missing_notes()
    }

    fn recompute(&mut self, remaining: u32) {
        self.total_accounted = self.received_good.saturating_add(self.issue_total());
        self.has_issues = self.issue_total() > 0;
        self.is_over_delivery = self.received_good > remaining;
        self.over_delivery_amount = self.received_good.saturating_sub(remaining);
        self.is_valid = if self.is_over_delivery {
            // Over-delivery is permitted only through received-good.
            self.issue_total() == 0
        } else {
            self.total_accounted > 0 && self.total_accounted <= remaining
        };
    }
}

/// Pure reducer: `(WorkingStatus, Edit) -> WorkingStatus` against the group's
/// remaining quantity. Selection policy (a fully-accounted group cannot be
/// selected) is enforced by the session, not here.
pub fn apply(status: &WorkingStatus, edit: &Edit, remaining: u32) -> WorkingStatus {
    let mut next = status.clone();
    match edit {
        Edit::Select => next.selected = true,
        // Deselecting clears nothing; re-selecting restores the last values.
        Edit::Deselect => next.selected = false,
        Edit::Set(bucket, qty) => next.set_bucket(*bucket, *qty),
        Edit::QuickFill(bucket) => {
            let already_filled =
                next.bucket(*bucket) == remaining && next.total_accounted == next.bucket(*bucket);
            next.zero_buckets();
            if !already_filled {
                next.set_bucket(*bucket, remaining);
            }
        }
        Edit::Notes(text) => next.issue_notes = text.clone(),
    }
    next.recompute(remaining);
    next
}
