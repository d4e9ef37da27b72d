use std::collections::BTreeMap;

use crate::model::{DeliveryGroup, GroupKey, LineItem};

/// Group line items by (item type, merchant), summing ordered and
/// already-received quantities. Members are kept in input order for
/// apportionment at submission. A missing merchant degrades to the
/// no-merchant sentinel key rather than erroring.
pub fn group_line_items(items: &[LineItem]) -> Vec<DeliveryGroup> {
    let mut groups: BTreeMap<GroupKey, (u32, u32, Vec<LineItem>)> = BTreeMap::new();

    for item in items {
        let key = GroupKey {
            item_type_id: item.item_type_id.clone(),
            merchant_id: item.merchant_id.clone(),
        };
        let entry = groups.entry(key).or_insert_with(|| (0, 0, Vec::new()));
        entry.0 = entry.0.saturating_add(item.ordered);
        entry.1 = entry.1.saturating_add(item.received_good);
        entry.2.push(item.clone());
    }

    groups
        .into_iter()
        .map(|(key, (ordered, already_received, items))| DeliveryGroup {
            key,
            ordered,
            already_received,
            prior_issue_qty: 0,
            remaining: ordered.saturating_sub(already_received),
            items,
            prior_issues: Vec::new(),
        })
        .collect()
}
