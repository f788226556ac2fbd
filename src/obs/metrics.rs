// self
use crate::{
	obs::{FlowKind, FlowOutcome},
	store::StoreError,
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_broker_flow_total",
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

/// Records a cache-store failure the broker swallowed; provisioning proceeds uncached.
pub fn record_store_failure(op: &'static str, err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(op, error = %err, "Cache store failed; continuing without cache.");
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("token_broker_store_failure_total", "op" => op).increment(1);
	}

	#[cfg(not(feature = "tracing"))]
	let _ = err;
	#[cfg(all(not(feature = "tracing"), not(feature = "metrics")))]
	let _ = op;
}
