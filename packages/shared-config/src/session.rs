//! Session cookie configuration types

use crate::{get_env_or_default, ConfigError, ConfigResult};

/// Default name of the cookie carrying the session id
pub const DEFAULT_COOKIE_NAME: &str = "qid";

/// Default session lifetime (7 days)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 3600;

/// Server-side session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie that carries the session id
    pub cookie_name: String,

    /// Session lifetime in seconds, used for both the store TTL and cookie Max-Age
    pub ttl_secs: u64,

    /// Key prefix for sessions persisted in Redis
    pub key_prefix: String,
}

impl SessionConfig {
    /// Load session configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let cookie_name = get_env_or_default("SESSION_COOKIE_NAME", DEFAULT_COOKIE_NAME);
        if !is_valid_cookie_name(&cookie_name) {
            return Err(ConfigError::InvalidValue(
                "SESSION_COOKIE_NAME".to_string(),
                format!("'{}' is not a valid cookie name", cookie_name),
            ));
        }

        let ttl_secs = match std::env::var("SESSION_TTL") {
            Ok(raw) => parse_duration_secs(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "SESSION_TTL".to_string(),
                    format!("'{}' is not a duration like 30m, 12h or 7d", raw),
                )
            })?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            cookie_name,
            ttl_secs,
            key_prefix: get_env_or_default("SESSION_KEY_PREFIX", "sess:"),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
            key_prefix: "sess:".to_string(),
        }
    }
}

/// Parse duration strings like "15m", "7d", "24h" to seconds
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.is_ascii() {
        return None;
    }

    let (num_str, unit) = s.split_at(s.len() - 1);
    let num: u64 = num_str.parse().ok()?;

    let secs = match unit {
        "s" => num,
        "m" => num.checked_mul(60)?,
        "h" => num.checked_mul(3600)?,
        "d" => num.checked_mul(24 * 3600)?,
        "w" => num.checked_mul(7 * 24 * 3600)?,
        _ => return None,
    };

    (secs > 0).then_some(secs)
}

/// RFC 6265 token characters only
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
