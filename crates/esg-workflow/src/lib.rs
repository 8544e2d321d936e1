//! Registration and attestation workflow for the ESG registry.
//!
//! A [`SessionHandle`] owns the one wallet connection of an application. A
//! [`Workflow`] configured with a [`Role`] drives the
//! register → attest → query lifecycle of content identifiers through that
//! session, and a [`Feed`] registers simulated telemetry on a fixed interval.

pub mod error;
pub mod feed;
mod local;
pub mod role;
pub mod session;
pub mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use feed::{Feed, FeedEvent, DEFAULT_FEED_INTERVAL};
pub use role::{Action, Role};
pub use session::{Connection, Deployment, Session, SessionHandle};
pub use workflow::{parse_identifier, Attestation, ContentState, FeedEntry, Registration, Workflow};

pub use esg_finance::BalanceReport;
pub use esg_types::{ContentId, ReportStatus};
