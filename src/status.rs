use std::collections::HashMap;

use crate::error::QueryError;
use crate::packet::RESPONSE_HEADER_LEN;

/// Constant block after the response echo: `splitnum\0` plus two marker bytes.
const KV_SECTION_PADDING: [u8; 11] = [
    0x73, 0x70, 0x6C, 0x69, 0x74, 0x6E, 0x75, 0x6D, 0x00, 0x80, 0x00,
];

/// Constant block between the key/value section and the player list:
/// `\x01player_\0\0`.
const PLAYER_SECTION_PADDING: [u8; 10] = [
    0x01, 0x70, 0x6C, 0x61, 0x79, 0x65, 0x72, 0x5F, 0x00, 0x00,
];

/// Decoded full-stat response as obtained by [query](crate::query::query).
///
/// `fields` holds whatever key/value pairs the server sent; the well-known
/// keys have named accessors below. Servers are free to omit keys, so every
/// accessor returns an `Option`.
#[derive(Debug, PartialEq, Eq)]
pub struct ServerStatus {
    fields: HashMap<String, String>,
    players: Vec<String>,
}

impl ServerStatus {
    /// Decode the body of a stat response.
    ///
    /// Layout: 5-byte echo, 11-byte constant, NUL-terminated key/value
    /// pairs ended by an empty key, 10-byte constant, NUL-terminated player
    /// names ended by an empty name or end of data. The constant blocks are
    /// verified advisorily only; a mismatch is logged, not fatal, since the
    /// sections themselves are self-delimiting.
    pub fn parse(data: &[u8]) -> Result<ServerStatus, QueryError> {
        let mut offset: usize = RESPONSE_HEADER_LEN;

        if data.len() < offset + KV_SECTION_PADDING.len() {
            return Err(QueryError::TruncatedResponse("key/value padding"));
        }
        check_padding(
            &data[offset..offset + KV_SECTION_PADDING.len()],
            &KV_SECTION_PADDING,
            "key/value",
        );
        offset += KV_SECTION_PADDING.len();

        let mut fields: HashMap<String, String> = HashMap::new();
        loop {
            let key = get_string(data, &mut offset)?;
            if key.is_empty() {
                break;
            }
            let value = get_string(data, &mut offset)?;
            fields.insert(key, value);
        }

        if data.len() < offset + PLAYER_SECTION_PADDING.len() {
            return Err(QueryError::TruncatedResponse("player padding"));
        }
        check_padding(
            &data[offset..offset + PLAYER_SECTION_PADDING.len()],
            &PLAYER_SECTION_PADDING,
            "player",
        );
        offset += PLAYER_SECTION_PADDING.len();

        let mut players: Vec<String> = Vec::new();
        while offset < data.len() {
            let name = get_string(data, &mut offset)?;
            if name.is_empty() {
                break;
            }
            players.push(name);
        }

        Ok(ServerStatus { fields, players })
    }

    /// All key/value pairs exactly as sent by the server.
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Connected player names, in the order the server listed them.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    /// Value for an arbitrary field key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Message of the day. The wire calls this key `hostname`.
    pub fn motd(&self) -> Option<&str> {
        self.get("hostname")
    }

    pub fn gametype(&self) -> Option<&str> {
        self.get("gametype")
    }

    pub fn game_id(&self) -> Option<&str> {
        self.get("game_id")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version")
    }

    pub fn plugins(&self) -> Option<&str> {
        self.get("plugins")
    }

    pub fn map(&self) -> Option<&str> {
        self.get("map")
    }

    pub fn num_players(&self) -> Option<&str> {
        self.get("numplayers")
    }

    pub fn max_players(&self) -> Option<&str> {
        self.get("maxplayers")
    }

    pub fn host_port(&self) -> Option<&str> {
        self.get("hostport")
    }

    pub fn host_ip(&self) -> Option<&str> {
        self.get("hostip")
    }
}

/// Get the value of a NUL-terminated string with index 0 at `offset`
/// in an array of bytes.
///
/// Mutates `offset` to the index after the termination byte. Running out
/// of data finalizes the token read so far instead of failing, so a
/// truncated datagram can never hang the decoder.
fn get_string(data: &[u8], offset: &mut usize) -> Result<String, QueryError> {
    let start_offset: usize = *offset;
    let mut end_offset: usize = *offset;
    let mut terminated = false;

    while let Some(c) = data.get(end_offset) {
        end_offset += 1;
        if c == &0u8 {
            terminated = true;
            break;
        }
    }
    *offset = end_offset;

    let token_end = if terminated { end_offset - 1 } else { end_offset };
    Ok(std::str::from_utf8(&data[start_offset..token_end])?.to_string())
}

/// Advisory check of a fixed padding block. Servers occasionally vary the
/// non-semantic marker bytes, so a mismatch is worth a warning but must not
/// fail the decode.
fn check_padding(actual: &[u8], expected: &[u8], section: &str) {
    if actual != expected {
        log::warn!(
            "unexpected {} section padding: {:02X?} (expected {:02X?})",
            section,
            actual,
            expected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a well-formed stat response from key/value pairs and players.
    fn build_response(pairs: &[(&str, &str)], players: &[&str]) -> Vec<u8> {
        let mut data = vec![0x00, 0x01, 0x02, 0x03, 0x04];
        data.extend_from_slice(&KV_SECTION_PADDING);
        for (key, value) in pairs {
            data.extend_from_slice(key.as_bytes());
            data.push(0);
            data.extend_from_slice(value.as_bytes());
            data.push(0);
        }
        data.push(0);
        data.extend_from_slice(&PLAYER_SECTION_PADDING);
        for player in players {
            data.extend_from_slice(player.as_bytes());
            data.push(0);
        }
        data.push(0);
        data
    }

    #[test]
    fn decodes_full_response() {
        let pairs = [
            ("hostname", "A Minecraft Server"),
            ("gametype", "SMP"),
            ("game_id", "MINECRAFT"),
            ("version", "1.20.4"),
            ("plugins", ""),
            ("map", "world"),
            ("numplayers", "2"),
            ("maxplayers", "20"),
            ("hostport", "25565"),
            ("hostip", "127.0.0.1"),
        ];
        let data = build_response(&pairs, &["Alice", "Bob"]);
        let status = ServerStatus::parse(&data).unwrap();

        assert_eq!(status.fields().len(), pairs.len());
        for (key, value) in pairs {
            assert_eq!(status.get(key), Some(value));
        }
        assert_eq!(status.motd(), Some("A Minecraft Server"));
        assert_eq!(status.map(), Some("world"));
        assert_eq!(status.num_players(), Some("2"));
        assert_eq!(status.players(), &["Alice", "Bob"]);
    }

    #[test]
    fn double_nul_ends_key_value_section() {
        // trailing bytes after the double NUL belong to the player section
        // and must not leak into the field map
        let data = build_response(&[("map", "world")], &["Trailing"]);
        let status = ServerStatus::parse(&data).unwrap();

        assert_eq!(status.fields().len(), 1);
        assert_eq!(status.map(), Some("world"));
        assert_eq!(status.players(), &["Trailing"]);
    }

    #[test]
    fn empty_player_section_yields_empty_list() {
        let data = build_response(&[("map", "world")], &[]);
        let status = ServerStatus::parse(&data).unwrap();
        assert!(status.players().is_empty());
    }

    #[test]
    fn player_list_preserves_order() {
        let data = build_response(&[("map", "world")], &["Alice", "Bob"]);
        let status = ServerStatus::parse(&data).unwrap();
        assert_eq!(status.players(), &["Alice", "Bob"]);
    }

    #[test]
    fn eof_mid_player_name_finalizes_token() {
        let mut data = build_response(&[("map", "world")], &["Alice"]);
        // chop the final section terminator and half of a trailing name
        data.pop();
        data.extend_from_slice(b"Bo");
        let status = ServerStatus::parse(&data).unwrap();
        assert_eq!(status.players(), &["Alice", "Bo"]);
    }

    #[test]
    fn missing_header_is_an_error() {
        assert!(matches!(
            ServerStatus::parse(&[0x00, 0x01, 0x02]),
            Err(QueryError::TruncatedResponse(_))
        ));
    }

    #[test]
    fn truncation_before_player_padding_is_an_error() {
        let full = build_response(&[("map", "world")], &[]);
        // keep the echo, first padding and the key/value section but
        // drop the player padding
        let cut = full.len() - PLAYER_SECTION_PADDING.len() - 1;
        assert!(matches!(
            ServerStatus::parse(&full[..cut]),
            Err(QueryError::TruncatedResponse("player padding"))
        ));
    }

    #[test]
    fn variant_padding_bytes_do_not_fail_decode() {
        let mut data = build_response(&[("map", "world")], &[]);
        // flip a marker byte inside the first constant block
        data[14] = 0x81;
        assert!(ServerStatus::parse(&data).is_ok());
    }

    #[test]
    fn independent_decodes_share_no_state() {
        let first = build_response(&[("map", "alpha")], &["Alice"]);
        let second = build_response(&[("map", "beta")], &["Bob", "Carol"]);

        let a = ServerStatus::parse(&first).unwrap();
        let b = ServerStatus::parse(&second).unwrap();

        assert_eq!(a.map(), Some("alpha"));
        assert_eq!(a.players(), &["Alice"]);
        assert_eq!(b.map(), Some("beta"));
        assert_eq!(b.players(), &["Bob", "Carol"]);
    }
}
