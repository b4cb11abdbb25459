//! Parsing of the Telegram Mini-App init-data payload.
//!
//! Telegram launches a Mini-App with a percent-encoded query string
//! (`user=%7B...%7D&auth_date=...&hash=...`) whose `user` value is a
//! JSON object describing the invoking user. Only the fields the gate
//! needs are extracted; signature validation of the payload belongs to
//! the backend, which re-checks the user id against its own records.

use serde::Deserialize;

use solgate_types::{Result, SolgateError, TelegramUserId};

// ---------------------------------------------------------------------------
// InitData
// ---------------------------------------------------------------------------

/// Fields extracted from the init-data payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitData {
    /// Identifier of the user who launched the Mini-App.
    pub user_id: TelegramUserId,
    /// Telegram username, if the user has one.
    pub username: Option<String>,
    /// Unix timestamp of the launch, if present.
    pub auth_date: Option<i64>,
}

/// The `user` JSON object embedded in the payload.
#[derive(Debug, Deserialize)]
struct InitDataUser {
    id: i64,
    username: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses an init-data query string.
///
/// Unknown keys are ignored. A payload without a `user` object (or with
/// a user object lacking an `id`) is an error: the gate cannot verify
/// anything without knowing who asked.
pub fn parse(raw: &str) -> Result<InitData> {
    let mut user: Option<InitDataUser> = None;
    let mut auth_date: Option<i64> = None;

    for pair in raw.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "user" => {
                let decoded = percent_decode(value)?;
                let parsed: InitDataUser =
                    serde_json::from_str(&decoded).map_err(|e| SolgateError::HostError {
                        reason: format!("malformed user object in init data: {e}"),
                    })?;
                user = Some(parsed);
            }
            "auth_date" => {
                auth_date = value.parse().ok();
            }
            _ => {}
        }
    }

    let user = user.ok_or_else(|| SolgateError::HostError {
        reason: "init data has no user object; launch from Telegram".into(),
    })?;

    Ok(InitData {
        user_id: TelegramUserId::new(user.id),
        username: user.username,
        auth_date,
    })
}

/// Decodes a percent-encoded component (`%XX` escapes, `+` as space).
pub fn percent_decode(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = s.get(i + 1..i + 3).ok_or_else(|| SolgateError::HostError {
                    reason: "truncated percent escape in init data".into(),
                })?;
                let byte =
                    u8::from_str_radix(hex, 16).map_err(|_| SolgateError::HostError {
                        reason: format!("invalid percent escape %{hex} in init data"),
                    })?;
                out.push(byte);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| SolgateError::HostError {
        reason: "init data is not valid UTF-8 after decoding".into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // user = {"id":123456789,"first_name":"Ada","username":"ada"}
    const SAMPLE: &str = "query_id=AAH4x1U&user=%7B%22id%22%3A123456789%2C%22first_name%22%3A%22Ada%22%2C%22username%22%3A%22ada%22%7D&auth_date=1712345678&hash=abcdef";

    #[test]
    fn parses_user_id_from_sample() -> Result<()> {
        let data = parse(SAMPLE)?;
        assert_eq!(data.user_id.as_i64(), 123_456_789);
        assert_eq!(data.username.as_deref(), Some("ada"));
        assert_eq!(data.auth_date, Some(1_712_345_678));
        Ok(())
    }

    #[test]
    fn missing_user_is_error() {
        let result = parse("auth_date=1712345678&hash=abcdef");
        assert!(result.is_err());
    }

    #[test]
    fn malformed_user_json_is_error() {
        let result = parse("user=%7Bnot-json%7D");
        assert!(result.is_err());
    }

    #[test]
    fn user_without_id_is_error() {
        // {"username":"ada"}
        let result = parse("user=%7B%22username%22%3A%22ada%22%7D");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_keys_ignored() -> Result<()> {
        let data = parse("foo=bar&user=%7B%22id%22%3A7%7D")?;
        assert_eq!(data.user_id.as_i64(), 7);
        assert_eq!(data.username, None);
        Ok(())
    }

    #[test]
    fn percent_decode_basic() -> Result<()> {
        assert_eq!(percent_decode("%7B%22a%22%3A1%7D")?, r#"{"a":1}"#);
        assert_eq!(percent_decode("plain")?, "plain");
        assert_eq!(percent_decode("a+b")?, "a b");
        Ok(())
    }

    #[test]
    fn percent_decode_truncated_escape() {
        assert!(percent_decode("abc%7").is_err());
        assert!(percent_decode("abc%").is_err());
    }

    #[test]
    fn percent_decode_invalid_hex() {
        assert!(percent_decode("%zz").is_err());
    }

    #[test]
    fn percent_decode_utf8() -> Result<()> {
        // "é" percent-encoded.
        assert_eq!(percent_decode("caf%C3%A9")?, "café");
        Ok(())
    }
}
