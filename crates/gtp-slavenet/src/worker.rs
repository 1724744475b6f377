use gtp_core::CommandId;
use gtp_coordination::Engine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Reads lines from `reader` until a blank line terminates the GTP reply,
/// returning the accumulated body (blank terminator excluded). `None` means
/// the socket closed before a terminator arrived.
async fn read_framed_reply(
    reader: &mut (impl AsyncBufReadExt + Unpin),
) -> Option<String> {
    let mut body = String::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await.ok()?;
        if n == 0 {
            return None; // EOF before a blank-line terminator: disconnect.
        }
        if line == "\n" || line == "\r\n" {
            return Some(body);
        }
        body.push_str(&line);
    }
}

/// Parses the leading `=<id>` / `?<id>` token of a reply's first line.
/// Returns the id and whether the ack was affirmative (`=`).
fn parse_ack(first_line: &str) -> Option<(CommandId, bool)> {
    let mut chars = first_line.chars();
    let sigil = chars.next()?;
    let affirmative = match sigil {
        '=' => true,
        '?' => false,
        _ => return None,
    };
    let rest = chars.as_str();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let raw: u32 = digits.parse().ok()?;
    Some((CommandId::from_raw(raw), affirmative))
}

/// Runs the identity handshake and, if it succeeds, the service loop for one
/// accepted slave connection until the socket closes. Returns `true` once
/// the slave has entered the service loop and been counted active, so the
/// caller knows whether a matching `disconnect()` is owed; a connection
/// rejected during the handshake (bad or missing `name` reply) never
/// touches the active-slave counter at all.
pub async fn run_slave(stream: TcpStream, engine: Engine, client_addr: String) -> bool {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    if write_half.write_all(b"name\n").await.is_err() {
        return false;
    }
    let Some(identity) = read_framed_reply(&mut reader).await else {
        log::warn!("[slave {client_addr}] closed before identity reply");
        return false;
    };
    let first_line = identity.lines().next().unwrap_or("");
    if !first_line.to_ascii_lowercase().starts_with("= pachi") {
        log::warn!("[slave {client_addr}] rejected identity {first_line:?}");
        return false;
    }
    log::info!("[slave {client_addr}] identity accepted");
    engine.connect().await;

    let mut last_cmd_id_sent: Option<CommandId> = None;
    let mut resend_pending = true; // first payload is always a full catch-up.

    loop {
        let (payload, sent_id) = engine
            .wait_for_payload(last_cmd_id_sent, resend_pending)
            .await;
        if write_half.write_all(payload.as_bytes()).await.is_err() {
            break;
        }
        if write_half.flush().await.is_err() {
            break;
        }
        last_cmd_id_sent = Some(sent_id);

        let Some(reply_body) = read_framed_reply(&mut reader).await else {
            log::debug!("[slave {client_addr}] disconnected");
            break;
        };
        let first_line = reply_body.lines().next().unwrap_or("");
        let ack = parse_ack(first_line);
        let (reply_id, affirmative) = match ack {
            Some((id, ok)) => (Some(id), ok),
            None => (None, false),
        };

        let accepted = engine
            .submit_reply(sent_id, reply_id, affirmative, reply_body)
            .await;
        resend_pending = !accepted;
        if resend_pending {
            log::debug!("[slave {client_addr}] desynchronized, will resend history");
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_affirmative_ack() {
        let (id, ok) = parse_ack("=42 1800 4").unwrap();
        assert_eq!(id.raw(), 42);
        assert!(ok);
    }

    #[test]
    fn parses_negative_ack() {
        let (id, ok) = parse_ack("?7 illegal move").unwrap();
        assert_eq!(id.raw(), 7);
        assert!(!ok);
    }

    #[test]
    fn rejects_missing_sigil() {
        assert!(parse_ack("42 1800 4").is_none());
    }

    #[test]
    fn rejects_missing_digits() {
        assert!(parse_ack("=oops").is_none());
    }

    #[tokio::test]
    async fn reads_until_blank_line() {
        let data = b"line one\nline two\n\nleftover".to_vec();
        let mut reader = BufReader::new(std::io::Cursor::new(data));
        let body = read_framed_reply(&mut reader).await.unwrap();
        assert_eq!(body, "line one\nline two\n");
    }

    #[tokio::test]
    async fn eof_before_blank_line_is_disconnect() {
        let data = b"line one\n".to_vec();
        let mut reader = BufReader::new(std::io::Cursor::new(data));
        assert!(read_framed_reply(&mut reader).await.is_none());
    }
}
