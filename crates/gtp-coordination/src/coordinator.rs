use crate::aggregator::Aggregator;
use crate::engine::Engine;
use crate::state::LastStats;
use gtp_core::{Color, Config};
use tokio::time::Instant;

/// What the upstream GTP driver should do with a command it handed to
/// `notify`.
#[derive(Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The command was intercepted and must not be forwarded to slaves; the
    /// driver answers it itself (or it requires no reply at all).
    PassThrough,
    /// The command was broadcast and a quorum of replies was collected
    /// before returning; present for commands other than the three
    /// long-running ones that report asynchronously.
    Broadcast,
    /// The command was broadcast but the caller (`genmove` / `dead_group_list`)
    /// is responsible for waiting on the result with its own deadline.
    AwaitElsewhere,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenmoveResult {
    pub coord: String,
    pub playouts: u64,
    pub value_from_black: f32,
    /// Sum of every replying slave's reported `total_playouts`.
    pub total_playouts: u64,
    /// Sum of every replying slave's reported `threads`.
    pub threads: u64,
}

const NO_FANOUT: &[&str] = &["uct_genbook", "uct_dumpbook", "kgs-chat"];

/// Names the translation a GTP command undergoes before it is broadcast to
/// slaves, because the slave-side engine answers to different verbs than
/// the ones the upstream driver speaks.
fn translate(cmd: &str) -> &str {
    match cmd {
        "genmove" => "pachi-genmoves",
        "kgs-genmove_cleanup" => "pachi-genmoves_cleanup",
        "final_score" => "final_status_list",
        other => other,
    }
}

fn awaits_elsewhere(translated: &str) -> bool {
    matches!(
        translated,
        "pachi-genmoves" | "pachi-genmoves_cleanup" | "final_status_list"
    )
}

/// Drives one engine instance's Command Log and Reply Buffer on behalf of
/// the upstream GTP driver. This is the only component that knows the
/// command-translation table and the fan-out/fan-in policy; everything
/// else (connection lifecycle, aggregation) is delegated.
pub struct Coordinator {
    engine: Engine,
    slaves_quit: bool,
}

impl Coordinator {
    pub fn new(engine: Engine, config: &Config) -> Self {
        Self {
            engine,
            slaves_quit: config.slaves_quit,
        }
    }

    /// Implements spec'd `notify(cmd, args)`: filters, translates, installs,
    /// and either waits out a quorum itself or defers to the caller.
    pub async fn notify(&self, cmd: &str, args: &str) -> NotifyOutcome {
        if cmd == "quit" && !self.slaves_quit {
            return NotifyOutcome::PassThrough;
        }
        if NO_FANOUT.contains(&cmd) {
            return NotifyOutcome::PassThrough;
        }

        let translated = translate(cmd);
        let is_gamestart = crate::command_log::is_gamestart(translated);
        self.engine.install(translated, args, is_gamestart).await;

        if awaits_elsewhere(translated) {
            NotifyOutcome::AwaitElsewhere
        } else {
            self.engine.await_quorum(None).await;
            NotifyOutcome::Broadcast
        }
    }

    /// Waits for the `pachi-genmoves` quorum `notify` already broadcast,
    /// aggregates the replies, fixes the chosen move into the Command Log
    /// as a `play` command, and returns it.
    pub async fn genmove(&self, color: Color, deadline: Option<Instant>) -> Option<GenmoveResult> {
        let replies = self.engine.await_quorum(deadline).await;
        let aggregate = Aggregator::aggregate(&replies)?;

        self.engine
            .install("play", &format!("{} {}", color, aggregate.coord), false)
            .await;
        self.engine
            .record_stats(LastStats {
                color,
                coord: aggregate.coord.clone(),
                playouts: aggregate.playouts,
                value_from_black: aggregate.value_from_black,
                total_playouts: aggregate.total_playouts,
                threads: aggregate.threads,
            })
            .await;

        Some(GenmoveResult {
            coord: aggregate.coord,
            playouts: aggregate.playouts,
            value_from_black: aggregate.value_from_black,
            total_playouts: aggregate.total_playouts,
            threads: aggregate.threads,
        })
    }

    /// Waits for the `final_status_list` quorum, takes a plurality vote
    /// over the raw reply bodies, and returns the first coordinate of each
    /// dead group in the winning reply. The winning reply's first line
    /// carries the `=<id>` ack prefix ahead of its first group; every
    /// subsequent line is a group on its own.
    pub async fn dead_group_list(&self) -> Vec<String> {
        let replies = self.engine.await_quorum(None).await;
        let winner = match plurality(&replies) {
            Some(w) => w,
            None => return Vec::new(),
        };
        winner
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                let fields: Vec<&str> = line.split_whitespace().collect();
                let group = if i == 0 { fields.get(1..)? } else { &fields[..] };
                group.first().map(|s| s.to_string())
            })
            .collect()
    }

    /// `chat("winrate")`: reports the last chosen move's stats, normalized
    /// to the requesting color, alongside the current active-slave count.
    pub async fn chat_winrate(&self, from: Color) -> Option<(LastStats, f32, usize)> {
        let stats = self.engine.last_stats().await?;
        let winrate = from.normalize(stats.value_from_black);
        let active = self.engine.active_slaves().await;
        Some((stats, winrate, active))
    }
}

/// Finds the longest run of identical strings, treating each reply as an
/// opaque token (spec.md §4.4's "sort lexicographically, longest run of
/// equal strings").
fn plurality(replies: &[String]) -> Option<&str> {
    if replies.is_empty() {
        return None;
    }
    let mut sorted: Vec<&str> = replies.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut best: Option<(&str, usize)> = None;
    let mut run_start = 0;
    for i in 1..=sorted.len() {
        if i == sorted.len() || sorted[i] != sorted[run_start] {
            let run_len = i - run_start;
            let beats_best = match best {
                None => true,
                Some((_, len)) => run_len > len,
            };
            if beats_best {
                best = Some((sorted[run_start], run_len));
            }
            run_start = i;
        }
    }
    best.map(|(s, _)| s)
}
