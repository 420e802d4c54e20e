//! Observability helpers for relay flows.
//!
//! - Every flow runs inside a `tracing` span named `oauth2_relay.flow` with the `flow` (leg)
//!   and `stage` (call site) fields.
//! - Enable the `metrics` feature to increment the `oauth2_relay_flow_total` counter for every
//!   attempt/success/rejection/failure, labeled by `flow` + `outcome`.
//! - [`init_subscriber`] installs the process-wide `tracing-subscriber` stack used by the
//!   binary.

mod metrics;
mod subscriber;
mod tracing;

pub use self::{metrics::*, subscriber::*, tracing::*};

// self
use crate::_prelude::*;

/// Relay legs observed by the instrumentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Browser redirect to the authorize endpoint.
	Redirect,
	/// Callback carrying the authorization code and the token exchange behind it.
	Callback,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Redirect => "redirect",
			FlowKind::Callback => "callback",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a relay flow.
	Attempt,
	/// Successful completion (for callbacks: the provider answered, whatever the status).
	Success,
	/// Request rejected before any outbound call (missing authorization code).
	Rejected,
	/// Internal or transport failure.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Rejected => "rejected",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
