use crate::state::{LastStats, SharedState};
use gtp_core::CommandId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

const GRACE_PERIOD: Duration = Duration::from_millis(500);

struct Inner {
    state: Mutex<SharedState>,
    command_available: Notify,
    reply_available: Notify,
}

/// The coordination object owned by one running engine instance and shared
/// by every Slave Worker and the Coordinator. Cloning an `Engine` is cheap
/// (it is a handle around an `Arc`); every clone refers to the same
/// underlying state, mutex, and condition variables.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    pub fn new(max_slaves: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SharedState::with_capacity(max_slaves)),
                command_available: Notify::new(),
                reply_available: Notify::new(),
            }),
        }
    }

    /// Installs a new command at the tail of the log: resets the log first
    /// if this is a game-start command or the log is empty, appends, resets
    /// the reply buffer, and wakes every Slave Worker.
    pub async fn install(&self, cmd_word: &str, args: &str, is_gamestart: bool) -> CommandId {
        let id = {
            let mut guard = self.inner.state.lock().await;
            if guard.log.is_empty() || is_gamestart {
                guard.log.reset_for_new_game();
            }
            let id = guard.log.append(cmd_word, args);
            guard.replies.reset();
            id
        };
        self.inner.command_available.notify_waiters();
        id
    }

    pub async fn active_slaves(&self) -> usize {
        self.inner.state.lock().await.active_slaves
    }

    pub async fn connect(&self) {
        self.inner.state.lock().await.active_slaves += 1;
    }

    pub async fn disconnect(&self) {
        let mut guard = self.inner.state.lock().await;
        guard.active_slaves = guard.active_slaves.saturating_sub(1);
    }

    pub async fn record_stats(&self, stats: LastStats) {
        self.inner.state.lock().await.last_stats = Some(stats);
    }

    pub async fn last_stats(&self) -> Option<LastStats> {
        self.inner.state.lock().await.last_stats.clone()
    }

    /// Slave Worker step 2–3: waits while `last_cmd_id_sent == tail id` and
    /// no resend is pending, then returns the payload to send (full history
    /// on resend, the single broadcast command otherwise) and the id that
    /// was just sent.
    pub async fn wait_for_payload(
        &self,
        last_cmd_id_sent: Option<CommandId>,
        resend_pending: bool,
    ) -> (String, CommandId) {
        loop {
            let notified = self.inner.command_available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let guard = self.inner.state.lock().await;
                let tail_id = guard.log.tail_id();
                let idle = tail_id == last_cmd_id_sent && !resend_pending;
                if !idle {
                    if let Some(id) = tail_id {
                        let payload = if resend_pending {
                            guard.log.full_history()
                        } else {
                            guard.log.broadcast_payload()
                        };
                        return (payload, id);
                    }
                }
            }
            notified.await;
        }
    }

    /// Slave Worker step 6–7 classification: deposits the reply if its id
    /// matches what was just sent and it is affirmative, and wakes the
    /// Coordinator. Otherwise leaves state untouched — the caller is
    /// responsible for setting `resend_pending`.
    pub async fn submit_reply(
        &self,
        last_cmd_id_sent: CommandId,
        reply_id: Option<CommandId>,
        affirmative: bool,
        body: String,
    ) -> bool {
        if reply_id == Some(last_cmd_id_sent) && affirmative {
            {
                let mut guard = self.inner.state.lock().await;
                guard.replies.push(body);
            }
            self.inner.reply_available.notify_waiters();
            true
        } else {
            false
        }
    }

    /// Waits for a quorum of replies to the current command, subject to
    /// spec.md §4.4's rules, and returns the replies collected so far.
    /// Never returns with an empty reply set.
    pub async fn await_quorum(&self, deadline: Option<Instant>) -> Vec<String> {
        let mut effective_deadline = deadline;
        loop {
            enum Action {
                Return(Vec<String>),
                WaitForever,
                WaitUntil(Instant),
            }

            let notified = self.inner.reply_available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let action = {
                let guard = self.inner.state.lock().await;
                let active = guard.active_slaves;
                let count = guard.replies.len();
                let now = Instant::now();
                if count >= active && count > 0 {
                    Action::Return(guard.replies.as_slice().to_vec())
                } else if count == 0 {
                    Action::WaitForever
                } else if effective_deadline.is_some_and(|d| now >= d) {
                    Action::Return(guard.replies.as_slice().to_vec())
                } else {
                    if count * 2 >= active {
                        let grace = now + GRACE_PERIOD;
                        let tighten = match effective_deadline {
                            None => true,
                            Some(d) => grace < d,
                        };
                        if tighten {
                            effective_deadline = Some(grace);
                        }
                    }
                    match effective_deadline {
                        Some(d) => Action::WaitUntil(d),
                        None => Action::WaitForever,
                    }
                }
            };

            match action {
                Action::Return(replies) => return replies,
                Action::WaitForever => notified.await,
                Action::WaitUntil(d) => {
                    let remaining = d.saturating_duration_since(Instant::now());
                    let _ = tokio::time::timeout(remaining, notified).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quorum_returns_once_all_active_replied() {
        let engine = Engine::new(4);
        engine.connect().await;
        engine.connect().await;
        engine.install("boardsize", "19", true).await;
        let id = { engine.inner.state.lock().await.log.tail_id().unwrap() };
        engine.submit_reply(id, Some(id), true, "=1 ok".into()).await;
        engine.submit_reply(id, Some(id), true, "=1 ok".into()).await;
        let replies = engine.await_quorum(None).await;
        assert_eq!(replies.len(), 2);
    }

    #[tokio::test]
    async fn quorum_never_returns_empty() {
        let engine = Engine::new(4);
        engine.connect().await;
        engine.install("boardsize", "19", true).await;
        let id = { engine.inner.state.lock().await.log.tail_id().unwrap() };
        let engine2 = engine.clone();
        let handle = tokio::spawn(async move { engine2.await_quorum(None).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        engine.submit_reply(id, Some(id), true, "=1 ok".into()).await;
        let replies = handle.await.unwrap();
        assert_eq!(replies.len(), 1);
    }

    #[tokio::test]
    async fn mismatched_reply_is_not_deposited() {
        let engine = Engine::new(4);
        engine.install("boardsize", "19", true).await;
        let id = { engine.inner.state.lock().await.log.tail_id().unwrap() };
        let stale = CommandId::from_raw(id.raw() ^ 0b10);
        let accepted = engine.submit_reply(stale, Some(id), true, "body".into()).await;
        assert!(!accepted);
        assert_eq!(engine.inner.state.lock().await.replies.len(), 0);
    }

    #[tokio::test]
    async fn disconnect_never_underflows() {
        let engine = Engine::new(4);
        engine.disconnect().await;
        assert_eq!(engine.active_slaves().await, 0);
    }
}
