use gtp_coordination::{Coordinator, NotifyOutcome};
use gtp_core::Color;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::Instant;

/// A minimal stdin/stdout GTP driver loop: enough wiring to exercise the
/// Coordinator interactively, not a conformant GTP front-end. A real
/// deployment sits this master behind an actual GTP-speaking controller
/// (out of scope — spec.md §1).
pub async fn run(coordinator: Coordinator, move_budget: Duration) -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();
    let mut to_move = Color::Black;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("").trim();

        let reply = dispatch(&coordinator, cmd, args, &mut to_move, move_budget).await;
        stdout.write_all(reply.as_bytes()).await?;
        stdout.flush().await?;

        if cmd == "quit" {
            break;
        }
    }
    Ok(())
}

async fn dispatch(
    coordinator: &Coordinator,
    cmd: &str,
    args: &str,
    to_move: &mut Color,
    move_budget: Duration,
) -> String {
    if cmd == "chat" && args.trim() == "winrate" {
        return match coordinator.chat_winrate(*to_move).await {
            Some((stats, winrate, active)) => format!(
                "= {} {} {} {:.3} ({active} slaves, {} playouts, {} threads)\n\n",
                stats.color, stats.coord, stats.playouts, winrate, stats.total_playouts, stats.threads
            ),
            None => "= no data yet\n\n".to_string(),
        };
    }

    match coordinator.notify(cmd, args).await {
        NotifyOutcome::PassThrough => "=\n\n".to_string(),
        NotifyOutcome::Broadcast => {
            if cmd == "play" {
                if let Some(color) = args.split_whitespace().next().and_then(|c| c.parse().ok()) {
                    *to_move = Color::opposite(color);
                }
            }
            "=\n\n".to_string()
        }
        NotifyOutcome::AwaitElsewhere => {
            let deadline = Instant::now() + move_budget;
            match cmd {
                "genmove" => {
                    let color = args.parse().unwrap_or(*to_move);
                    match coordinator.genmove(color, Some(deadline)).await {
                        Some(result) => {
                            *to_move = color.opposite();
                            format!("= {}\n\n", result.coord)
                        }
                        None => "? no move available\n\n".to_string(),
                    }
                }
                "kgs-genmove_cleanup" => {
                    let color = args.parse().unwrap_or(*to_move);
                    match coordinator.genmove(color, Some(deadline)).await {
                        Some(result) => {
                            *to_move = color.opposite();
                            format!("= {}\n\n", result.coord)
                        }
                        None => "? no move available\n\n".to_string(),
                    }
                }
                "final_status_list" | "final_score" => {
                    let dead = coordinator.dead_group_list().await;
                    format!("= {}\n\n", dead.join(" "))
                }
                _ => "=\n\n".to_string(),
            }
        }
    }
}
