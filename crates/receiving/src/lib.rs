//! `stockroom-receiving` — delivery reconciliation engine for purchase orders.
//!
//! Pure engine crate: takes an order's line items, a prior issue history, and
//! operator decisions about a new batch of incoming goods, and produces a
//! validated per-line-item change-set. No CLI or IO dependencies; the
//! external order-management system is reached only through the
//! [`gateway::OrderGateway`] trait.

pub mod aggregate;
pub mod error;
pub mod gateway;
pub mod history;
pub mod model;
pub mod project;
pub mod session;
pub mod status;
pub mod summary;

pub use error::{GatewayError, ReceivingError};
pub use gateway::{open_session, submit, OrderGateway};
pub use model::{ChangeSet, DeliveryGroup, GroupKey, IssueKind, IssueRecord, LineItem};
pub use session::{Phase, ReconcileSession};
pub use status::{Bucket, Edit, WorkingStatus};
pub use summary::{Progress, ValidationReport};
