// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the handshake, credential source, and query client.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("jira_oauth.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event when the handshake moves to a new state.
pub fn record_transition(from: &'static str, to: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(from, to, "handshake state transition");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (from, to);
	}
}

/// Emits a warning when a credential source is skipped because it could not be used.
pub fn record_source_skipped(source: &'static str, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(source, reason = %reason, "credential source skipped");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (source, reason);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn event_helpers_are_noops_without_tracing() {
		record_transition("init", "request_token_pending");
		record_source_skipped("file", &"unreadable");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::Query, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
