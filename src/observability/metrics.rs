//! Metrics collection for `EmoSpy`.
//!
//! Counters and gauges are recorded through the `metrics` facade whether
//! or not a recorder is installed; without one every call is a no-op.
//! Labels are drawn from closed enums only, so cardinality is bounded.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::EmoSpyError;
use crate::game::state::Phase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the Prometheus recorder.
///
/// When `port` is `Some`, an HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// endpoint.
///
/// # Errors
///
/// Returns `EmoSpyError::Io` if the recorder or listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), EmoSpyError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| EmoSpyError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("emospy_rounds_started_total", "Rounds dealt");
    describe_counter!(
        "emospy_phase_transitions_total",
        "Phase transitions by source and target phase"
    );
    describe_counter!(
        "emospy_rounds_resolved_total",
        "Resolved rounds by winning side"
    );
    describe_counter!(
        "emospy_discussion_skipped_total",
        "Discussions ended early by skipping the timer"
    );
    describe_gauge!("emospy_players", "Players at the table in the current round");
    describe_gauge!("emospy_current_phase", "Currently active phase (1 = active)");
}

/// Records a newly dealt round.
#[allow(clippy::cast_precision_loss)]
pub fn record_round_started(players: usize) {
    counter!("emospy_rounds_started_total").increment(1);
    gauge!("emospy_players").set(players as f64);
}

/// Records a phase transition and moves the current-phase gauge.
pub fn record_phase_transition(from: Phase, to: Phase) {
    counter!(
        "emospy_phase_transitions_total",
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    gauge!("emospy_current_phase", "phase" => from.as_str()).set(0.0);
    gauge!("emospy_current_phase", "phase" => to.as_str()).set(1.0);
}

/// Records a resolved round.
pub fn record_round_resolved(outsider_won: bool) {
    counter!("emospy_rounds_resolved_total", "winner" => winner_label(outsider_won)).increment(1);
}

/// Records a skipped discussion timer.
pub fn record_discussion_skipped() {
    counter!("emospy_discussion_skipped_total").increment(1);
}

/// Label for the winning side.
#[must_use]
pub const fn winner_label(outsider_won: bool) -> &'static str {
    if outsider_won { "outsider" } else { "regulars" }
}
