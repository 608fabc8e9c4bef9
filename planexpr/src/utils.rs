use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique identifier for a manager.
///
/// Types and nodes remember the id of the manager that issued them, which lets a manager
/// reject handles coming from another environment.
pub(crate) fn next_context_id() -> u64 {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}
