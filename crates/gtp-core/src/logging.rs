//! Dual terminal+file logging. The terminal stream is the operator's
//! dashboard and stays terse; the file stream is the forensic record for
//! diagnosing a mis-accounted slave (spec.md §4.2's handshake-before-count
//! ordering, §8's quorum-timing invariants) after the fact, so it runs at
//! full verbosity with module and thread identity attached regardless of
//! what the operator asked to see live.

use std::str::FromStr;

/// Picks the terminal log level: an explicit `RUST_LOG` wins outright (for
/// ad-hoc debugging against a single module), otherwise `-v` stacks from the
/// default `Info` up through `Debug`/`Trace`, one step per repeat.
fn terminal_level(verbosity: u8) -> log::LevelFilter {
    if let Ok(raw) = std::env::var("RUST_LOG") {
        if let Ok(level) = log::LevelFilter::from_str(&raw) {
            return level;
        }
    }
    match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Initializes the global logger. Safe to call once at process startup.
/// `verbosity` is the number of times the operator repeated `-v` on the
/// command line.
#[cfg(feature = "server")]
pub fn init(verbosity: u8) {
    std::fs::create_dir_all("logs").expect("create logs directory");

    let term_config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        terminal_level(verbosity),
        term_config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    // The file sink always runs at Trace with target and thread id visible:
    // slaves are served one task per accept slot, so a desync report needs
    // both the module that logged it and which slot's task logged it, not
    // just the "[slave addr]"/"[slot N]" text each call site already embeds
    // in its message.
    let file_config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Debug)
        .set_thread_level(log::LevelFilter::Debug)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Trace,
        file_config,
        std::fs::File::create(format!("logs/{time}.log")).expect("create log file"),
    );

    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Registers a Ctrl-C handler that logs and exits immediately. Graceful
/// draining of in-flight slave connections is not attempted: the
/// coordination core has no persisted state to flush.
#[cfg(feature = "server")]
pub fn install_ctrlc_handler() {
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        log::warn!("interrupt received, shutting down without draining slave connections");
        std::process::exit(0);
    });
}

#[cfg(all(test, feature = "server"))]
mod tests {
    use super::*;

    #[test]
    fn default_verbosity_is_info() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(terminal_level(0), log::LevelFilter::Info);
    }

    #[test]
    fn repeated_flag_climbs_to_debug_then_trace() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(terminal_level(1), log::LevelFilter::Debug);
        assert_eq!(terminal_level(2), log::LevelFilter::Trace);
    }

    #[test]
    fn rust_log_env_overrides_verbosity_flag() {
        std::env::set_var("RUST_LOG", "warn");
        assert_eq!(terminal_level(2), log::LevelFilter::Warn);
        std::env::remove_var("RUST_LOG");
    }
}
