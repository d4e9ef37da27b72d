//! Submission projection — turns aggregated decisions back into per-line-item
//! change entries.
//!
//! Quantities are apportioned across a group's members by each member's share
//! of the group's ordered total, using the largest-remainder method so the
//! apportioned sum always equals the aggregate exactly.

use chrono::{DateTime, Utc};

use crate::model::{ChangeSet, DeliveryGroup, IssueEntry, IssueKind, ItemChange};
use crate::status::WorkingStatus;

/// Split `total` across `weights` proportionally. Floors every share, then
/// hands the leftover units out one each in descending fractional-remainder
/// order (ties broken by position). Zero total weight puts everything on the
/// first entry.
pub fn apportion(total: u32, weights: &[u32]) -> Vec<u32> {
    if weights.is_empty() {
        return Vec::new();
    }
    let weight_sum: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if weight_sum == 0 {
        let mut shares = vec![0; weights.len()];
        shares[0] = total;
        return shares;
    }

    let mut shares: Vec<u32> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, u64)> = Vec::with_capacity(weights.len());
    let mut assigned: u64 = 0;

    for (i, &w) in weights.iter().enumerate() {
        let scaled = u64::from(total) * u64::from(w);
        shares.push((scaled / weight_sum) as u32);
        remainders.push((i, scaled % weight_sum));
        assigned += scaled / weight_sum;
    }

    let mut leftover = u64::from(total) - assigned;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (i, _) in remainders {
        if leftover == 0 {
            break;
        }
        shares[i] += 1;
        leftover -= 1;
    }

    shares
}

/// Build the change-set for all selected groups. Members with a zero
/// received-good share and no issue entries are omitted. Issue buckets are
/// apportioned per member the same way as received-good quantities.
pub fn build_change_set(
    groups: &[DeliveryGroup],
    statuses: &[WorkingStatus],
    general_notes: Option<String>,
    received_at: DateTime<Utc>,
) -> ChangeSet {
    const ISSUE_BUCKETS: [IssueKind; 4] = [
        IssueKind::Damaged,
        IssueKind::NeverArrived,
        IssueKind::WrongItem,
        IssueKind::Other,
    ];

    let mut items = Vec::new();

    for (group, status) in groups.iter().zip(statuses) {
        if !status.selected {
            continue;
        }

        let weights: Vec<u32> = group.items.iter().map(|i| i.ordered).collect();
        let good_shares = apportion(status.received_good, &weights);

        let mut issue_shares: Vec<(IssueKind, Vec<u32>)> = Vec::new();
        for kind in ISSUE_BUCKETS {
            let qty = match kind {
                IssueKind::Damaged => status.damaged,
                IssueKind::NeverArrived => status.never_arrived,
                IssueKind::WrongItem => status.wrong_item,
                IssueKind::Other => status.other,
            };
            if qty > 0 {
                issue_shares.push((kind, apportion(qty, &weights)));
            }
        }

        for (mi, member) in group.items.iter().enumerate() {
            let received_good = good_shares[mi];
            let issues: Vec<IssueEntry> = issue_shares
                .iter()
                .filter(|(_, shares)| shares[mi] > 0)
                .map(|(kind, shares)| IssueEntry {
                    kind: *kind,
                    quantity: shares[mi],
                    notes: status.issue_notes.clone(),
                })
                .collect();

            if received_good == 0 && issues.is_empty() {
                continue;
            }
            items.push(ItemChange {
                line_item_id: member.id.clone(),
                received_good,
                issues,
            });
        }
    }

    ChangeSet {
        received_at: received_at.to_rfc3339(),
        general_notes,
        items,
    }
}
