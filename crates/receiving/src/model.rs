use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One ordered quantity of an item type on a purchase order.
/// Immutable once fetched; belongs to exactly one order.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub id: String,
    pub item_type_id: String,
    pub merchant_id: Option<String>,
    pub ordered: u32,
    /// Good units already received in prior sessions.
    pub received_good: u32,
}

/// A previously reported discrepancy against one line item.
/// Created outside this engine; the engine only reads it.
#[derive(Debug, Clone)]
pub struct IssueRecord {
    pub id: String,
    pub line_item_id: String,
    pub kind: IssueKind,
    pub quantity: u32,
    pub description: String,
    pub status: IssueStatus,
    pub reported_by: String,
    pub reported_at: DateTime<Utc>,
    pub resolution: Option<IssueResolution>,
}

#[derive(Debug, Clone)]
pub struct IssueResolution {
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
    pub kind: ResolutionKind,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Damaged,
    NeverArrived,
    WrongItem,
    Other,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Damaged => write!(f, "damaged"),
            Self::NeverArrived => write!(f, "never_arrived"),
            Self::WrongItem => write!(f, "wrong_item"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for IssueKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "damaged" => Ok(Self::Damaged),
            "never_arrived" => Ok(Self::NeverArrived),
            "wrong_item" => Ok(Self::WrongItem),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStatus {
    Reported,
    Resolved,
}

impl std::str::FromStr for IssueStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "reported" => Ok(Self::Reported),
            "resolved" => Ok(Self::Resolved),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    Credited,
    Replaced,
    Accepted,
    Other,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group key = (item type, merchant). The same item from the same merchant
/// may appear as several underlying line items; the operator works on one
/// group per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub item_type_id: String,
    pub merchant_id: Option<String>,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.merchant_id {
            Some(m) => write!(f, "{}-{m}", self.item_type_id),
            None => write!(f, "{}-no-merchant", self.item_type_id),
        }
    }
}

/// Line items merged by group key, plus the folded-in issue history.
///
/// Seeding invariant (consistent histories):
/// `already_received + prior_issue_qty + remaining == ordered`.
/// `remaining` saturates at 0 when upstream history over-accounts.
#[derive(Debug, Clone)]
pub struct DeliveryGroup {
    pub key: GroupKey,
    pub ordered: u32,
    pub already_received: u32,
    pub prior_issue_qty: u32,
    pub remaining: u32,
    /// Members in input order, kept for apportionment at submission.
    pub items: Vec<LineItem>,
    pub prior_issues: Vec<IssueRecord>,
}

// ---------------------------------------------------------------------------
// Change-set (submission payload)
// ---------------------------------------------------------------------------

/// The full contract handed to the external order-management system.
/// One entry per member line item that received units or has new issues.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeSet {
    pub received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_notes: Option<String>,
    pub items: Vec<ItemChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemChange {
    pub line_item_id: String,
    pub received_good: u32,
    pub issues: Vec<IssueEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueEntry {
    pub kind: IssueKind,
    pub quantity: u32,
    pub notes: String,
}
