//! Optional observability helpers for the handshake and query flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jira_oauth.flow` with the `flow` and
//!   `stage` (call site) fields, plus events for handshake state transitions and credential
//!   source fallbacks.
//! - Enable `metrics` to count flow outcomes in `jira_oauth_flow_total` (labels `flow` and
//!   `outcome`) and failed handshakes in `jira_oauth_handshake_failure_total` (label `reason`).

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Three-legged OAuth handshake.
	Handshake,
	/// Credential resolution (environment, file, handshake).
	CredentialSource,
	/// Signed read-only REST query.
	Query,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Handshake => "handshake",
			FlowKind::CredentialSource => "credential_source",
			FlowKind::Query => "query",
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
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Counts one outcome of `kind` in `jira_oauth_flow_total`.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"jira_oauth_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a handshake that ended in `Failed(reason)` in `jira_oauth_handshake_failure_total`.
pub fn record_handshake_failure(reason: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("jira_oauth_handshake_failure_total", "reason" => reason).increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(FlowKind::CredentialSource.to_string(), "credential_source");
		assert_eq!(FlowOutcome::Attempt.as_str(), "attempt");
	}

	#[test]
	fn counters_accept_every_label_without_a_recorder() {
		for kind in [FlowKind::Handshake, FlowKind::CredentialSource, FlowKind::Query] {
			record_flow_outcome(kind, FlowOutcome::Failure);
		}

		record_handshake_failure("timed_out");
	}
}
