//! Application-level payload conventions.
//!
//! Two tiny textual grammars tie the testbed together:
//!
//! - The backend answers a card report with a body containing either the
//!   literal `NOT FOUND` or `STATUS:` followed by one status character.
//! - The relay node accepts the single-byte command payloads `1` / `0`
//!   on its command topic.
//!
//! Anything outside these shapes is unparsed: logged by the caller,
//! silently dropped, no state change.

/// Longest raw command payload retained for logging unknown commands.
pub const MAX_COMMAND_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Backend verdict
// ---------------------------------------------------------------------------

/// Parsed backend response to a card report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerVerdict {
    /// The card identifier is not registered.
    NotFound,
    /// The card toggled to the given status (single-character token).
    Status(char),
}

impl ServerVerdict {
    /// Parse a response body. `NOT FOUND` wins regardless of any other
    /// content; otherwise the character immediately following `STATUS:`
    /// is the verdict. Any other body yields `None`.
    pub fn parse(body: &str) -> Option<Self> {
        if body.contains("NOT FOUND") {
            return Some(Self::NotFound);
        }
        let (_, rest) = body.split_once("STATUS:")?;
        let code = rest.chars().next()?;
        Some(Self::Status(code))
    }

    /// Wire form published on the telemetry topic: `-1` for a miss,
    /// the bare status character otherwise.
    pub fn telemetry_code(&self) -> heapless::String<4> {
        let mut out = heapless::String::new();
        match self {
            Self::NotFound => {
                let _ = out.push_str("-1");
            }
            Self::Status(c) => {
                let _ = out.push(*c);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Relay command
// ---------------------------------------------------------------------------

/// Decoded command-topic payload for the relay node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCommand {
    /// Engage the relay (payload exactly `1`).
    On,
    /// Release the relay (payload exactly `0`).
    Off,
    /// Anything else — logged and ignored, no actuation. Carries a
    /// truncated copy of the raw payload for the log line.
    Unknown(heapless::Vec<u8, MAX_COMMAND_LEN>),
}

impl RelayCommand {
    /// Exact-match decode against the ASCII payloads `1` and `0`.
    pub fn decode(payload: &[u8]) -> Self {
        match payload {
            b"1" => Self::On,
            b"0" => Self::Off,
            other => {
                let mut raw = heapless::Vec::new();
                let take = other.len().min(MAX_COMMAND_LEN);
                // Capacity matches `take`, extend cannot fail.
                let _ = raw.extend_from_slice(&other[..take]);
                Self::Unknown(raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_not_found() {
        assert_eq!(
            ServerVerdict::parse("RFID NOT FOUND"),
            Some(ServerVerdict::NotFound)
        );
    }

    #[test]
    fn not_found_wins_over_trailing_content() {
        assert_eq!(
            ServerVerdict::parse("NOT FOUND -- extra STATUS:9 junk"),
            Some(ServerVerdict::NotFound)
        );
    }

    #[test]
    fn parses_status_character() {
        assert_eq!(
            ServerVerdict::parse("STATUS:7"),
            Some(ServerVerdict::Status('7'))
        );
        assert_eq!(
            ServerVerdict::parse("prefix STATUS:1 suffix"),
            Some(ServerVerdict::Status('1'))
        );
    }

    #[test]
    fn truncated_status_is_unparsed() {
        assert_eq!(ServerVerdict::parse("STATUS:"), None);
    }

    #[test]
    fn garbage_is_unparsed() {
        assert_eq!(ServerVerdict::parse(""), None);
        assert_eq!(ServerVerdict::parse("ERROR: No RFID data received"), None);
        assert_eq!(ServerVerdict::parse("status:1"), None);
    }

    #[test]
    fn telemetry_codes() {
        assert_eq!(ServerVerdict::NotFound.telemetry_code().as_str(), "-1");
        assert_eq!(ServerVerdict::Status('3').telemetry_code().as_str(), "3");
        assert_eq!(ServerVerdict::Status('0').telemetry_code().as_str(), "0");
    }

    #[test]
    fn decodes_exact_commands() {
        assert_eq!(RelayCommand::decode(b"1"), RelayCommand::On);
        assert_eq!(RelayCommand::decode(b"0"), RelayCommand::Off);
    }

    #[test]
    fn near_misses_are_unknown() {
        for payload in [&b""[..], b"01", b"10", b"ON", b"true", b"1 "] {
            assert!(matches!(
                RelayCommand::decode(payload),
                RelayCommand::Unknown(_)
            ));
        }
    }

    #[test]
    fn unknown_retains_truncated_payload() {
        let long = [b'x'; 64];
        match RelayCommand::decode(&long) {
            RelayCommand::Unknown(raw) => assert_eq!(raw.len(), MAX_COMMAND_LEN),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
