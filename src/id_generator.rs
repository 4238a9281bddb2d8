//! Collision-resistant identifiers for nodes, edges, and diagrams.
//!
//! Ids combine a millisecond timestamp with a process-wide wrapping counter
//! so that many ids minted within the same millisecond stay unique. The
//! guarantee is per-session only; diagrams are edited by a single client at
//! a time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

const COUNTER_WRAP: u64 = 10_000;

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

// The counter is shared across all three generators.
fn next_counter() -> u64 {
    (ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1) % COUNTER_WRAP
}

pub fn generate_node_id() -> String {
    format!("node-{}-{}", now_millis(), next_counter())
}

pub fn generate_edge_id() -> String {
    format!("edge-{}-{}", now_millis(), next_counter())
}

pub fn generate_diagram_id() -> String {
    format!("diagram-{}-{}", now_millis(), next_counter())
}

/// Resets the shared counter to a known state. Intended for tests.
pub fn reset_id_counter() {
    ID_COUNTER.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // One test covers reset and uniqueness so concurrent test threads in
    // this module cannot race on the shared counter.
    #[test]
    fn ids_are_unique_within_a_session() {
        reset_id_counter();
        assert!(generate_node_id().ends_with("-1"));
        assert!(generate_edge_id().ends_with("-2"));

        let mut seen = HashSet::new();
        for _ in 0..5_000 {
            assert!(seen.insert(generate_node_id()));
            assert!(seen.insert(generate_edge_id()));
        }

        let diagram_id = generate_diagram_id();
        assert!(diagram_id.starts_with("diagram-"));
        assert!(seen.iter().all(|id| id != &diagram_id));
    }
}
