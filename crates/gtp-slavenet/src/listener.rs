use crate::worker::run_slave;
use gtp_coordination::Engine;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Binds `slave_port` and pre-creates `max_slaves` acceptor tasks, each
/// looping on the shared listening socket (spec.md §4.3). Accept
/// concurrency is left to the kernel; no explicit slave registry is kept.
pub async fn serve(slave_port: u16, max_slaves: usize, engine: Engine) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", slave_port)).await?;
    log::info!("listening for slaves on port {slave_port} (max {max_slaves})");
    let listener = Arc::new(listener);

    let mut slots = Vec::with_capacity(max_slaves);
    for slot in 0..max_slaves {
        let listener = listener.clone();
        let engine = engine.clone();
        slots.push(tokio::spawn(accept_loop(slot, listener, engine)));
    }

    for slot in slots {
        let _ = slot.await;
    }
    Ok(())
}

async fn accept_loop(slot: usize, listener: Arc<TcpListener>, engine: Engine) {
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("[slot {slot}] accept failed: {e}");
                continue;
            }
        };
        log::info!("[slot {slot}] accepted slave {addr}");
        let entered_service = run_slave(stream, engine.clone(), addr.to_string()).await;
        if entered_service {
            engine.disconnect().await;
            log::info!("[slot {slot}] slave {addr} disconnected");
        } else {
            log::info!("[slot {slot}] slave {addr} rejected during handshake");
        }
    }
}
