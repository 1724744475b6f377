use gtp_core::CommandId;

/// One entry of the command log: a command as it was broadcast to slaves,
/// with its id rewritable in place (clearing the reply-required flag)
/// without changing the log's overall shape.
#[derive(Clone, Debug)]
pub struct LoggedCommand {
    id: CommandId,
    cmd_word: String,
    args: String,
}

impl LoggedCommand {
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn cmd_word(&self) -> &str {
        &self.cmd_word
    }

    /// Renders the wire form `<id> <cmd_word> <args>\n` (or `<id> <cmd_word>\n`
    /// when there are no arguments).
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            format!("{} {}\n", self.id, self.cmd_word)
        } else {
            format!("{} {} {}\n", self.id, self.cmd_word, self.args)
        }
    }
}

/// Commands that start a fresh game and reset the command log.
const GAMESTART_COMMANDS: &[&str] = &["boardsize", "clear_board"];

pub fn is_gamestart(cmd: &str) -> bool {
    GAMESTART_COMMANDS.contains(&cmd)
}

/// Append-only record of every GTP command issued in the current game.
///
/// This is the variant design spec.md §9 sanctions: a `Vec<LoggedCommand>`
/// rather than a raw preallocated byte buffer with pointer arithmetic. The
/// contiguous-buffer invariants still hold logically: `tail()` is always the
/// one command with the reply-required flag set, and `full_history()`
/// replays the whole game from the start.
#[derive(Default)]
pub struct CommandLog {
    commands: Vec<LoggedCommand>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops every recorded command; the next `append` starts a fresh game
    /// at ordinal 0.
    pub fn reset_for_new_game(&mut self) {
        self.commands.clear();
    }

    pub fn tail(&self) -> Option<&LoggedCommand> {
        self.commands.last()
    }

    pub fn tail_id(&self) -> Option<CommandId> {
        self.tail().map(LoggedCommand::id)
    }

    /// Rewrites the current tail's id to clear its reply-required flag
    /// (preserving ordinal and nonce, and therefore column width), advances
    /// the tail, and appends a fresh reply-required command.
    pub fn append(&mut self, cmd_word: &str, args: &str) -> CommandId {
        let previous_id = self.tail_id();
        if let Some(last) = self.commands.last_mut() {
            last.id = last.id.prevent_reply();
        }
        let ordinal = self.commands.len() as u32;
        let id = CommandId::force_reply(ordinal, previous_id);
        self.commands.push(LoggedCommand {
            id,
            cmd_word: cmd_word.to_string(),
            args: args.to_string(),
        });
        id
    }

    /// The byte range a synchronized slave must receive: just the tail
    /// command.
    pub fn broadcast_payload(&self) -> String {
        self.tail().map(LoggedCommand::render).unwrap_or_default()
    }

    /// The byte range a desynchronized slave must receive: the whole
    /// replayable transcript from game start through the tail command.
    pub fn full_history(&self) -> String {
        self.commands.iter().map(LoggedCommand::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_ordinal_zero_after_reset() {
        let mut log = CommandLog::new();
        let id = log.append("boardsize", "19");
        assert_eq!(id.ordinal(), 0);
        assert!(id.reply_required());
    }

    #[test]
    fn exactly_one_command_has_reply_flag_set() {
        let mut log = CommandLog::new();
        log.append("boardsize", "19");
        log.append("clear_board", "");
        log.append("play", "B D4");
        let flagged = log
            .commands
            .iter()
            .filter(|c| c.id.reply_required())
            .count();
        assert_eq!(flagged, 1);
        assert!(log.tail().unwrap().id.reply_required());
    }

    #[test]
    fn append_preserves_id_width_on_rewrite() {
        let mut log = CommandLog::new();
        log.append("boardsize", "19");
        let first_text_len = log.commands[0].render().len();
        log.append("clear_board", "");
        let rewritten_len = log.commands[0].render().len();
        assert_eq!(first_text_len, rewritten_len);
    }

    #[test]
    fn broadcast_payload_is_tail_only() {
        let mut log = CommandLog::new();
        log.append("boardsize", "19");
        log.append("clear_board", "");
        let payload = log.broadcast_payload();
        assert_eq!(payload, log.tail().unwrap().render());
        assert!(!payload.contains("boardsize"));
    }

    #[test]
    fn full_history_replays_whole_game() {
        let mut log = CommandLog::new();
        log.append("boardsize", "19");
        log.append("clear_board", "");
        log.append("play", "B D4");
        let history = log.full_history();
        assert!(history.contains("boardsize"));
        assert!(history.contains("clear_board"));
        assert!(history.ends_with(&log.tail().unwrap().render()));
    }

    #[test]
    fn reset_clears_log_and_ordinal() {
        let mut log = CommandLog::new();
        log.append("boardsize", "19");
        log.append("play", "B D4");
        log.reset_for_new_game();
        assert!(log.is_empty());
        let id = log.append("boardsize", "19");
        assert_eq!(id.ordinal(), 0);
    }

    #[test]
    fn append_then_rewrite_then_append_matches_direct_sequence() {
        let mut a = CommandLog::new();
        a.append("boardsize", "19");
        a.append("clear_board", "");

        // Appending the second command is exactly "rewrite tail then append";
        // nothing distinguishes this from a log that was built the same way.
        let mut b = CommandLog::new();
        b.append("boardsize", "19");
        b.append("clear_board", "");

        assert_eq!(a.full_history(), b.full_history());
    }

    #[test]
    fn gamestart_detection() {
        assert!(is_gamestart("boardsize"));
        assert!(is_gamestart("clear_board"));
        assert!(!is_gamestart("play"));
        assert!(!is_gamestart("genmove"));
    }
}
