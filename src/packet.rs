use byteorder::{BigEndian, ByteOrder};

use crate::error::QueryError;

/// Every request frame starts with these two magic bytes.
pub const MAGIC: [u8; 2] = [0xFE, 0xFD];

/// Fixed session id sent with every request and echoed back by the server.
pub const SESSION_ID: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

/// Responses echo the command byte and session id before any payload.
pub const RESPONSE_HEADER_LEN: usize = 5;

/// Appending four zero bytes to the stat request selects the full-stat
/// response variant instead of the basic one.
const FULL_STAT_PADDING: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests a session challenge token. The server answers with the
    /// token as an ASCII decimal string.
    Handshake,
    /// Requests server statistics. Must carry the challenge token obtained
    /// by the preceding [Command::Handshake] on the same socket.
    Stat,
}

/// For packing a [Command] into a frame in [RequestPacket::pack].
impl Command {
    pub fn to_byte(&self) -> u8 {
        match self {
            Command::Handshake => 0x09,
            Command::Stat => 0x00,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RequestPacket {
    command: Command,
    challenge: Option<i32>,
}

impl RequestPacket {
    pub fn handshake() -> Self {
        RequestPacket {
            command: Command::Handshake,
            challenge: None,
        }
    }

    pub fn stat(challenge: i32) -> Self {
        RequestPacket {
            command: Command::Stat,
            challenge: Some(challenge),
        }
    }

    /// Serializes a request frame into an array of bytes.
    pub fn pack(&self) -> Vec<u8> {
        // frame structure: magic, command, session id (and challenge + padding)
        let mut payload: Vec<u8> = Vec::<u8>::new();
        payload.extend_from_slice(&MAGIC);
        payload.extend_from_slice(&[self.command.to_byte()]);
        payload.extend_from_slice(&SESSION_ID);
        if let Some(token) = self.challenge {
            // the token travels big-endian on the wire
            let mut token_bytes = [0u8; 4];
            BigEndian::write_i32(&mut token_bytes, token);
            payload.extend_from_slice(&token_bytes);
            payload.extend_from_slice(&FULL_STAT_PADDING);
        }

        payload
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn challenge(&self) -> Option<i32> {
        self.challenge
    }
}

/// Extract the challenge token from a handshake response.
///
/// The payload after the 5-byte echo is the token as an ASCII decimal
/// string. Trailing NUL bytes are trimmed first since fixed receive
/// buffers pad the datagram with zeros.
pub fn parse_challenge(data: &[u8]) -> Result<i32, QueryError> {
    if data.len() <= RESPONSE_HEADER_LEN {
        return Err(QueryError::TruncatedHeader(RESPONSE_HEADER_LEN));
    }

    let mut end = data.len();
    while end > RESPONSE_HEADER_LEN && data[end - 1] == 0 {
        end -= 1;
    }

    let token_str: &str = std::str::from_utf8(&data[RESPONSE_HEADER_LEN..end])?;
    token_str
        .parse::<i32>()
        .map_err(|_| QueryError::InvalidChallengeToken(token_str.to_string()))
}
