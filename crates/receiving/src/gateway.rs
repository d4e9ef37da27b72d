//! Contract with the external order-management collaborator.
//!
//! The engine owns no durable state. Line items and prior issues come in
//! through this trait, and the only write ever made is the single
//! `submit_delivery` call carrying the change-set.

use chrono::{DateTime, Utc};

use crate::error::{GatewayError, ReceivingError};
use crate::model::{ChangeSet, IssueRecord, LineItem};
use crate::session::ReconcileSession;

pub trait OrderGateway {
    fn fetch_line_items(&self, order_id: &str) -> Result<Vec<LineItem>, GatewayError>;
    fn fetch_issues(&self, order_id: &str) -> Result<Vec<IssueRecord>, GatewayError>;
    fn submit_delivery(&self, order_id: &str, change_set: &ChangeSet) -> Result<(), GatewayError>;
}

/// Open a ready session for an order. A line-item fetch failure is a hard
/// error (there is nothing to reconcile without them); an issue fetch
/// failure degrades to the empty-history fallback.
pub fn open_session(
    gateway: &impl OrderGateway,
    order_id: &str,
) -> Result<ReconcileSession, ReceivingError> {
    let items = gateway
        .fetch_line_items(order_id)
        .map_err(|e| ReceivingError::Gateway(e.to_string()))?;
    let mut session = ReconcileSession::open(order_id, items);
    session.resolve_history(gateway.fetch_issues(order_id))?;
    Ok(session)
}

/// Build the change-set and hand it to the collaborator. The session is
/// untouched either way, so a rejected submission can simply be retried.
pub fn submit(
    gateway: &impl OrderGateway,
    session: &ReconcileSession,
    received_at: DateTime<Utc>,
) -> Result<ChangeSet, ReceivingError> {
    let change_set = session.build_change_set(received_at)?;
    gateway
        .submit_delivery(session.order_id(), &change_set)
        .map_err(|e| ReceivingError::Gateway(e.to_string()))?;
    Ok(change_set)
}
