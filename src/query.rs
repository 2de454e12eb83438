use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::ServerError;
use crate::native::block::Block;
use crate::native::progress::Progress;
use crate::native::protocol::Profile;

static QUERY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next id from the process-global counter: strictly increasing for the life
/// of the process, rendered in decimal on the wire.
pub(crate) fn next_query_id() -> u64 { QUERY_COUNTER.fetch_add(1, Ordering::Relaxed) + 1 }

/// Callbacks a query drives while it executes.
///
/// All callbacks run synchronously on the caller's thread, in the order their
/// packets arrived, and must not call back into the [`Client`](crate::Client)
/// that is driving them. A panic unwinding out of a callback leaves the
/// connection mid-dialog and unusable.
pub trait QueryEvents {
    /// One call per data packet that carries rows.
    fn on_data(&mut self, block: Block) { let _ = block; }

    /// Zero or more times while the server works.
    fn on_progress(&mut self, progress: Progress) { let _ = progress; }

    /// At most once per query.
    fn on_profile(&mut self, profile: Profile) { let _ = profile; }

    /// At most once; the query is over when this fires.
    fn on_server_exception(&mut self, error: &ServerError) { let _ = error; }

    /// Exactly once on normal completion.
    fn on_finish(&mut self) {}
}

/// The silent sink, for dialogs whose results nobody wants.
impl QueryEvents for () {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_ids_are_strictly_increasing() {
        let first = next_query_id();
        let second = next_query_id();
        assert!(second > first);
        assert!(first > 0);
    }
}
