/*
    Metrics - counters and gauges for log and sync activity

    Names the events worth watching on a running node:
    - Log growth (appended vs merged-in entries)
    - Delta traffic per direction
    - Session lifecycle and failures

    Recording goes through the `metrics` facade; wiring up an exporter is
    the embedding process's choice.
*/

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    describe_counter!(
        "confab_entries_appended_total",
        "Total entries appended by the local process"
    );
    describe_counter!(
        "confab_entries_merged_total",
        "Total entries adopted from peer deltas"
    );

    describe_counter!(
        "confab_deltas_sent_total",
        "Total deltas pushed to peers, one per push regardless of frame count"
    );
    describe_counter!(
        "confab_deltas_received_total",
        "Total delta frames received from peers"
    );
    describe_histogram!(
        "confab_delta_entries",
        "Entries per non-empty delta pushed"
    );

    describe_counter!(
        "confab_sessions_opened_total",
        "Total sync sessions established, inbound and outbound"
    );
    describe_counter!(
        "confab_sessions_closed_total",
        "Total sync sessions fully terminated"
    );
    describe_counter!(
        "confab_session_errors_total",
        "Total session loop failures, labeled by direction (push, pull)"
    );
    describe_gauge!(
        "confab_active_sessions",
        "Current number of live sync sessions"
    );
}

/// Record a locally authored entry
pub fn entry_appended() {
    counter!("confab_entries_appended_total").increment(1);
}

/// Record entries adopted by a merge
pub fn entries_merged(count: usize) {
    if count > 0 {
        counter!("confab_entries_merged_total").increment(count as u64);
    }
}

/// Record a delta pushed to a peer
pub fn delta_sent(entries: usize) {
    counter!("confab_deltas_sent_total").increment(1);
    histogram!("confab_delta_entries").record(entries as f64);
}

/// Record a delta received from a peer
pub fn delta_received(_entries: usize) {
    counter!("confab_deltas_received_total").increment(1);
}

/// Record a session opening, with the new live count
pub fn session_opened(active: usize) {
    counter!("confab_sessions_opened_total").increment(1);
    gauge!("confab_active_sessions").set(active as f64);
}

/// Record a session fully closing, with the new live count
pub fn session_closed(active: usize) {
    counter!("confab_sessions_closed_total").increment(1);
    gauge!("confab_active_sessions").set(active as f64);
}

/// Record a loop failure in the given direction
pub fn session_error(direction: &'static str) {
    counter!("confab_session_errors_total", "direction" => direction).increment(1);
}

/// Update the live session gauge directly
pub fn set_active_sessions(count: usize) {
    gauge!("confab_active_sessions").set(count as f64);
}
