use crate::command_log::CommandLog;
use crate::replies::ReplyBuffer;
use gtp_core::Color;

/// Snapshot of the last move the Coordinator chose, reported back by
/// `chat("winrate")`.
#[derive(Clone, Debug)]
pub struct LastStats {
    pub color: Color,
    pub coord: String,
    pub playouts: u64,
    /// Win probability from Black's perspective.
    pub value_from_black: f32,
    /// Sum of every replying slave's reported `total_playouts`.
    pub total_playouts: u64,
    /// Sum of every replying slave's reported `threads`.
    pub threads: u64,
}

/// Everything guarded by the single coordination mutex: the Command Log,
/// the Reply Buffer, and the active-slave counter (spec.md §5).
#[derive(Default)]
pub struct SharedState {
    pub log: CommandLog,
    pub replies: ReplyBuffer,
    pub active_slaves: usize,
    pub last_stats: Option<LastStats>,
}

impl SharedState {
    pub fn with_capacity(max_slaves: usize) -> Self {
        Self {
            log: CommandLog::new(),
            replies: ReplyBuffer::with_capacity(max_slaves),
            active_slaves: 0,
            last_stats: None,
        }
    }
}
