use chrono::Utc;
use proptest::prelude::*;

use stockroom_receiving::aggregate::group_line_items;
use stockroom_receiving::history::apply_history;
use stockroom_receiving::project::apportion;
use stockroom_receiving::{
    Bucket, GroupKey, IssueKind, IssueRecord, LineItem, Phase, ReconcileSession, ReceivingError,
};

fn item(id: &str, item_type: &str, merchant: Option<&str>, ordered: u32, received: u32) -> LineItem {
    LineItem {
        id: id.into(),
        item_type_id: item_type.into(),
        merchant_id: merchant.map(Into::into),
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
        description: "prior report".into(),
        status: stockroom_receiving::model::IssueStatus::Reported,
        reported_by: "ops".into(),
        reported_at: Utc::now(),
        resolution: None,
    }
}

fn key(item_type: &str, merchant: Option<&str>) -> GroupKey {
    GroupKey {
        item_type_id: item_type.into(),
        merchant_id: merchant.map(Into::into),
    }
}

fn ready(items: Vec<LineItem>, issues: Vec<IssueRecord>) -> ReconcileSession {
    let mut session = ReconcileSession::open("po_1", items);
    session.resolve_history(Ok::<_, ReceivingError>(issues)).unwrap();
    session
}

// -------------------------------------------------------------------------
// End-to-end session flows
// -------------------------------------------------------------------------

#[test]
fn exact_fill_marks_group_valid() {
    let mut session = ready(vec![item("li_1", "sku_a", Some("acme"), 10, 4)], vec![]);
    let k = key("sku_a", Some("acme"));
    assert_eq!(session.group(&k).unwrap().remaining, 6);

    session.toggle_select(&k).unwrap();
    session.set_quantity(&k, Bucket::ReceivedGood, 6).unwrap();

    let status = session.status(&k).unwrap();
    assert!(status.is_valid);
    assert!(!status.is_over_delivery);
}

#[test]
fn over_delivery_through_received_good() {
    let mut session = ready(vec![item("li_1", "sku_a", Some("acme"), 10, 4)], vec![]);
    let k = key("sku_a", Some("acme"));

    session.toggle_select(&k).unwrap();
    session.set_quantity(&k, Bucket::ReceivedGood, 8).unwrap();

    let status = session.status(&k).unwrap();
    assert!(status.is_over_delivery);
    assert_eq!(status.over_delivery_amount, 2);
    assert!(status.is_valid);
}

#[test]
fn fully_accounted_group_rejects_selection() {
    let mut session = ready(
        vec![item("li_1", "sku_a", Some("acme"), 5, 0)],
        vec![issue("is_1", "li_1", IssueKind::NeverArrived, 5)],
    );
    let k = key("sku_a", Some("acme"));

    let group = session.group(&k).unwrap();
    assert_eq!(group.remaining, 0);
    assert!(session.status(&k).unwrap().is_fully_accounted);
    assert!(matches!(
        session.toggle_select(&k),
        Err(ReceivingError::NothingRemaining(_))
    ));
}

#[test]
fn issue_notes_gate_submission() {
    let mut session = ready(vec![item("li_1", "sku_a", Some("acme"), 10, 0)], vec![]);
    let k = key("sku_a", Some("acme"));

    session.toggle_select(&k).unwrap();
    session.set_quantity(&k, Bucket::Damaged, 3).unwrap();
    session.set_quantity(&k, Bucket::NeverArrived, 2).unwrap();

    let status = session.status(&k).unwrap();
    assert!(status.has_issues);
    assert_eq!(status.total_accounted, 5);
    assert!(status.is_valid);
    assert!(!session.can_submit());

    session.set_issue_notes(&k, "crate crushed in transit").unwrap();
    assert!(session.can_submit());
}

#[test]
fn history_fetch_failure_still_initializes() {
    let mut session = ReconcileSession::open(
        "po_1",
        vec![
            item("li_1", "sku_a", Some("acme"), 10, 4),
            item("li_2", "sku_b", None, 5, 0),
        ],
    );
    session
        .resolve_history(Err(ReceivingError::Gateway("issue service down".into())))
        .unwrap();

    assert_eq!(session.phase(), Phase::Ready);
    for group in session.groups() {
        assert_eq!(group.prior_issue_qty, 0);
        assert_eq!(group.remaining, group.ordered - group.already_received);
    }

    let k = key("sku_a", Some("acme"));
    session.toggle_select(&k).unwrap();
    session.quick_fill(&k, Bucket::ReceivedGood).unwrap();
    assert!(session.can_submit());
}

// -------------------------------------------------------------------------
// Cross-module flows
// -------------------------------------------------------------------------

#[test]
fn multi_group_session_submits_selected_only() {
    let mut session = ready(
        vec![
            item("li_1", "sku_a", Some("acme"), 6, 0),
            item("li_2", "sku_a", Some("acme"), 3, 0),
            item("li_3", "sku_b", Some("acme"), 4, 0),
        ],
        vec![],
    );
    let ka = key("sku_a", Some("acme"));
    let kb = key("sku_b", Some("acme"));

    session.toggle_select(&ka).unwrap();
    session.quick_fill(&ka, Bucket::ReceivedGood).unwrap();
    // sku_b edited but left unselected
    session.set_quantity(&kb, Bucket::ReceivedGood, 4).unwrap();

    let cs = session.build_change_set(Utc::now()).unwrap();
    let ids: Vec<&str> = cs.items.iter().map(|i| i.line_item_id.as_str()).collect();
    assert_eq!(ids, vec!["li_1", "li_2"]);
    assert_eq!(cs.items[0].received_good, 6);
    assert_eq!(cs.items[1].received_good, 3);
}

#[test]
fn issue_entries_carry_notes_per_member() {
    let mut session = ready(
        vec![
            item("li_1", "sku_a", Some("acme"), 8, 0),
            item("li_2", "sku_a", Some("acme"), 4, 0),
        ],
        vec![],
    );
    let k = key("sku_a", Some("acme"));
    session.toggle_select(&k).unwrap();
    session.set_quantity(&k, Bucket::ReceivedGood, 6).unwrap();
    session.set_quantity(&k, Bucket::Damaged, 6).unwrap();
    session.set_issue_notes(&k, "forklift incident").unwrap();

    let cs = session.build_change_set(Utc::now()).unwrap();
    assert_eq!(cs.items.len(), 2);
    let damaged_total: u32 = cs
        .items
        .iter()
        .flat_map(|i| i.issues.iter())
        .filter(|e| e.kind == IssueKind::Damaged)
        .map(|e| e.quantity)
        .sum();
    assert_eq!(damaged_total, 6);
    for entry in cs.items.iter().flat_map(|i| i.issues.iter()) {
        assert_eq!(entry.notes, "forklift incident");
    }
}

#[test]
fn incremental_sessions_converge() {
    // First session receives part of the order; the folded-back totals seed
    // the second session's remaining.
    let first = vec![item("li_1", "sku_a", Some("acme"), 10, 0)];
    let mut session = ready(first, vec![]);
    let k = key("sku_a", Some("acme"));
    session.toggle_select(&k).unwrap();
    session.set_quantity(&k, Bucket::ReceivedGood, 4).unwrap();
    let cs = session.build_change_set(Utc::now()).unwrap();
    assert_eq!(cs.items[0].received_good, 4);

    // External system folds the change-set into its persisted totals.
    let second = vec![item("li_1", "sku_a", Some("acme"), 10, 4)];
    let mut session = ready(second, vec![]);
    assert_eq!(session.group(&k).unwrap().remaining, 6);
    session.toggle_select(&k).unwrap();
    session.quick_fill(&k, Bucket::ReceivedGood).unwrap();
    assert!(session.can_submit());
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn arb_line_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(
        (0u8..4, prop::option::of(0u8..3), 0u32..50, 0u32..20),
        1..20,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (sku, merchant, ordered, received))| LineItem {
                id: format!("li_{i}"),
                item_type_id: format!("sku_{sku}"),
                merchant_id: merchant.map(|m| format!("m_{m}")),
                ordered,
                received_good: received.min(ordered),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn aggregator_partitions_input(items in arb_line_items()) {
        let groups = group_line_items(&items);
        let mut member_ids: Vec<String> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.id.clone()))
            .collect();
        member_ids.sort();
        let mut input_ids: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
        input_ids.sort();
        prop_assert_eq!(member_ids, input_ids);

        for group in &groups {
            prop_assert_eq!(group.ordered, group.items.iter().map(|i| i.ordered).sum::<u32>());
        }
    }

    #[test]
    fn history_invariant_holds(items in arb_line_items(), issue_qty in 0u32..30) {
        let mut groups = group_line_items(&items);
        let issues: Vec<IssueRecord> = items
            .first()
            .map(|i| vec![issue("is_0", &i.id, IssueKind::Damaged, issue_qty)])
            .unwrap_or_default();
        apply_history(&mut groups, issues);
        for group in &groups {
            let accounted = group.already_received + group.prior_issue_qty;
            if accounted <= group.ordered {
                prop_assert_eq!(accounted + group.remaining, group.ordered);
            } else {
                prop_assert_eq!(group.remaining, 0);
            }
        }
    }

    #[test]
    fn apportion_conserves_and_bounds(total in 0u32..500, weights in prop::collection::vec(0u32..40, 1..8)) {
        let shares = apportion(total, &weights);
        prop_assert_eq!(shares.len(), weights.len());
        prop_assert_eq!(shares.iter().sum::<u32>(), total);
    }
}
