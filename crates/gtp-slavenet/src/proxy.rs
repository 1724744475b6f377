use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::Instant;

/// Binds `proxy_port` and forwards every line any connected slave writes
/// into the master's own log, prefixed `"< "` plus the client address and a
/// millisecond offset from proxy start-up (spec.md §6). Accepts an
/// unbounded number of connections; a dead or quiet slave ties up nothing
/// but its own task.
pub async fn serve(proxy_port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", proxy_port)).await?;
    log::info!("log proxy listening on port {proxy_port}");
    let start = Instant::now();

    loop {
        let (stream, addr) = listener.accept().await?;
        tokio::spawn(relay(stream, addr.to_string(), start));
    }
}

async fn relay(stream: tokio::net::TcpStream, client_addr: String, start: Instant) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let offset_ms = start.elapsed().as_millis();
                log::info!("< {client_addr} +{offset_ms}ms {}", line.trim_end());
            }
        }
    }
}
