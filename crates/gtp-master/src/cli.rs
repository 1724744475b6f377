use clap::Parser;

/// Process-level arguments for the GTP master binary. The comma-separated
/// `key=value` engine options (slave_port, proxy_port, max_slaves,
/// slaves_quit) are a separate, inner configuration surface (spec.md §6)
/// parsed by `gtp_core::Config` from `--options`, not expanded into
/// individual flags here — that string is what a GTP front-end would pass
/// through verbatim from its own `--engine` argument.
#[derive(Parser, Debug)]
#[command(name = "gtp-master", version, about = "Distributed Go engine master coordinator")]
pub struct Args {
    /// Comma-separated engine options, e.g. "slave_port=1234,max_slaves=8".
    #[arg(long)]
    pub options: String,

    /// Wall-clock budget for genmove, in seconds, when the upstream driver
    /// does not otherwise constrain it.
    #[arg(long, default_value_t = 5)]
    pub move_seconds: u64,

    /// Raise terminal log verbosity; repeatable (-v, -vv). Overridden by
    /// RUST_LOG when set. The log file always captures everything.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
