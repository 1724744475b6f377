//! TCP plumbing for the master: the per-connection Slave Worker protocol,
//! the accept-loop Listener that keeps `max_slaves` of them alive, and the
//! optional Log Proxy that relays slave stderr lines into the master's own
//! log.

mod listener;
mod proxy;
mod worker;

pub use listener::serve as serve_slaves;
pub use proxy::serve as serve_log_proxy;
pub use worker::run_slave;
