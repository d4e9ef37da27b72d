//! Issue-history folding — merges previously reported issues into groups.
//!
//! The fetch itself lives behind [`crate::gateway::OrderGateway`]; everything
//! here is pure so the fetch-failure fallback (empty history) is an ordinary
//! deterministic code path.

use std::collections::BTreeMap;

use crate::model::{DeliveryGroup, IssueRecord};

/// Index issues by the line item they were reported against.
pub fn index_issues(issues: Vec<IssueRecord>) -> BTreeMap<String, Vec<IssueRecord>> {
    let mut by_item: BTreeMap<String, Vec<IssueRecord>> = BTreeMap::new();
    for issue in issues {
        by_item.entry(issue.line_item_id.clone()).or_default().push(issue);
    }
    by_item
}

/// Fold prior issues into each group's running totals and recompute
/// `remaining`. Issues referencing line items outside the order are ignored.
/// Passing an empty history is the fetch-failure fallback: prior issues
/// count as 0 and `remaining = ordered - already_received`.
pub fn apply_history(groups: &mut [DeliveryGroup], issues: Vec<IssueRecord>) {
    let mut by_item = index_issues(issues);

    for group in groups.iter_mut() {
        let mut prior_issues = Vec::new();
        for item in &group.items {
            if let Some(mut found) = by_item.remove(&item.id) {
                prior_issues.append(&mut found);
            }
        }
        group.prior_issue_qty = prior_issues
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity));
        group.remaining = group
            .ordered
            .saturating_sub(group.already_received.saturating_add(group.prior_issue_qty));
        group.prior_issues = prior_issues;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::group_line_items;
    use crate::model::{IssueKind, IssueStatus, LineItem};

    fn item(id: &str, ordered: u32, received: u32) -> LineItem {
        LineItem {
            id: id.into(),
            item_type_id: "sku_a".into(),
            merchant_id: Some("acme".into()),
            ordered,
            received_good: received,
        }
    }

    fn issue(id: &str, line_item: &str, kind: IssueKind, quantity: u32) -> IssueRecord {
        IssueRecord {
            id: id.into(),
            line_item_id: line_item.into(),
            kind,
            quantity,
            description: "prior".into(),
            status: IssueStatus::Reported,
            reported_by: "ops".into(),
            reported_at: chrono::Utc::now(),
            resolution: None,
        }
    }

    #[test]
    fn folds_prior_issues_into_remaining() {
        let mut groups = group_line_items(&[item("li_1", 10, 4)]);
        apply_history(
            &mut groups,
            vec![issue("is_1", "li_1", IssueKind::Damaged, 2)],
        );
        assert_eq!(groups[0].prior_issue_qty, 2);
        assert_eq!(groups[0].remaining, 4);
        assert_eq!(groups[0].prior_issues.len(), 1);
        // Seeding invariant
        assert_eq!(
            groups[0].already_received + groups[0].prior_issue_qty + groups[0].remaining,
            groups[0].ordered
        );
    }

    #[test]
    fn sums_across_members_and_kinds() {
        let mut groups = group_line_items(&[item("li_1", 10, 0), item("li_2", 5, 0)]);
        apply_history(
            &mut groups,
            vec![
                issue("is_1", "li_1", IssueKind::Damaged, 2),
                issue("is_2", "li_2", IssueKind::WrongItem, 3),
                issue("is_3", "li_1", IssueKind::Other, 1),
            ],
        );
        assert_eq!(groups[0].prior_issue_qty, 6);
        assert_eq!(groups[0].remaining, 9);
        assert_eq!(groups[0].prior_issues.len(), 3);
    }

    #[test]
    fn unknown_line_item_ignored() {
        let mut groups = group_line_items(&[item("li_1", 10, 0)]);
        apply_history(
            &mut groups,
            vec![issue("is_1", "li_other", IssueKind::Damaged, 99)],
        );
        assert_eq!(groups[0].prior_issue_qty, 0);
        assert_eq!(groups[0].remaining, 10);
    }

    #[test]
    fn over_accounted_history_saturates() {
        let mut groups = group_line_items(&[item("li_1", 5, 3)]);
        apply_history(
            &mut groups,
            vec![issue("is_1", "li_1", IssueKind::NeverArrived, 4)],
        );
        assert_eq!(groups[0].remaining, 0);
    }

    #[test]
    fn huge_issue_quantities_saturate() {
        let mut groups = group_line_items(&[item("li_1", 10, 4)]);
        apply_history(
            &mut groups,
            vec![
                issue("is_1", "li_1", IssueKind::Damaged, u32::MAX),
                issue("is_2", "li_1", IssueKind::Other, 7),
            ],
        );
        assert_eq!(groups[0].prior_issue_qty, u32::MAX);
        assert_eq!(groups[0].remaining, 0);
    }

    #[test]
    fn empty_history_is_the_fallback() {
        let mut groups = group_line_items(&[item("li_1", 10, 4)]);
        apply_history(&mut groups, Vec::new());
        assert_eq!(groups[0].prior_issue_qty, 0);
        assert_eq!(groups[0].remaining, 6);
    }
}
