use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::QueryError;
use crate::packet::{parse_challenge, RequestPacket};
use crate::status::ServerStatus;

/// Default query port. This is the default *server* port reused as the
/// query port; servers configured with a distinct `query.port` need it
/// passed explicitly.
pub const DEFAULT_PORT: u16 = 25565;

/// Largest datagram we expect from a server. Full-stat responses for busy
/// servers with long plugin lists stay well under this.
const RECV_BUF_LEN: usize = 4096;

/// Knobs for a single query call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Applied separately to the connect and to each send and receive.
    pub timeout: Duration,
    /// Additional attempts after a failed exchange. Each attempt opens a
    /// fresh socket and redoes the whole handshake.
    pub retries: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 0,
        }
    }
}

/// Query `host`:`port` with the full-stat Query protocol.
///
/// Performs the handshake for a challenge token, then the stat request
/// carrying it, on a socket scoped to this call.
///
/// If `timeout_dur` is `Some(Duration)`, each round-trip step will use
/// `timeout_dur`. The default is 5 seconds if `timeout_dur` is `None`.
/// There are no retries; use [query_with_options] to configure them.
///
/// Example usage:
/// ```no_run
/// # async fn run() -> Result<(), mcquery::QueryError> {
/// let status = mcquery::query("mc.example.com", mcquery::DEFAULT_PORT, None).await?;
/// println!("{:?} online", status.num_players());
/// # Ok(())
/// # }
/// ```
pub async fn query(
    host: &str,
    port: u16,
    timeout_dur: Option<Duration>,
) -> Result<ServerStatus, QueryError> {
    let options = QueryOptions {
        timeout: timeout_dur.unwrap_or_else(|| QueryOptions::default().timeout),
        retries: 0,
    };
    query_with_options(host, port, &options).await
}

/// [query] with explicit timeout and retry configuration.
pub async fn query_with_options(
    host: &str,
    port: u16,
    options: &QueryOptions,
) -> Result<ServerStatus, QueryError> {
    let mut attempt: u32 = 0;
    loop {
        match query_once(host, port, options.timeout).await {
            Ok(status) => return Ok(status),
            Err(err) if attempt < options.retries => {
                attempt += 1;
                log::warn!(
                    "query attempt {} against {}:{} failed, retrying: {}",
                    attempt,
                    host,
                    port,
                    err
                );
            }
            Err(err) => return Err(err),
        }
    }
}

/// One full handshake + stat exchange on a fresh socket. The socket is
/// dropped on every exit path, success or failure.
async fn query_once(
    host: &str,
    port: u16,
    timeout_dur: Duration,
) -> Result<ServerStatus, QueryError> {
    // just arbitrarily bind any port, doesn't matter really
    let sock: UdpSocket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(QueryError::FailedPortBind)?;

    // connecting; resolution failures surface here, before any frame
    timeout(timeout_dur, sock.connect((host, port)))
        .await?
        .map_err(QueryError::UnreachableHost)?;

    // handshake for the session challenge
    let response = send_recv(&sock, RequestPacket::handshake(), timeout_dur).await?;
    let challenge: i32 = parse_challenge(&response)?;
    log::debug!("challenge token {} from {}:{}", challenge, host, port);

    // full stat
    let response = send_recv(&sock, RequestPacket::stat(challenge), timeout_dur).await?;
    ServerStatus::parse(&response)
}

async fn send_recv(
    sock: &UdpSocket,
    packet: RequestPacket,
    timeout_dur: Duration,
) -> Result<Vec<u8>, QueryError> {
    // sending
    timeout(timeout_dur, sock.send(&packet.pack()))
        .await?
        .map_err(QueryError::SendError)?;

    // receiving exactly one datagram
    let mut resp_buf: [u8; RECV_BUF_LEN] = [0u8; RECV_BUF_LEN];
    let len: usize = timeout(timeout_dur, sock.recv(&mut resp_buf))
        .await?
        .map_err(QueryError::ReceiveError)?;

    Ok(resp_buf[..len].to_vec())
}
