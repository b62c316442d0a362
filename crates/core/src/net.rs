//! Target address syntax validation.
//!
//! An endpoint address must be either an IP literal or an RFC-1123
//! hostname before it is handed to the scanner; anything else is
//! filtered out during target resolution.

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Maximum total hostname length.
const MAX_HOSTNAME_LEN: usize = 255;

/// Maximum length of a single hostname label.
const MAX_LABEL_LEN: usize = 63;

fn label_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("static regex"))
}

/// Whether `address` is a valid IPv4 or IPv6 literal.
pub fn is_valid_ip(address: &str) -> bool {
    IpAddr::from_str(address).is_ok()
}

/// Whether `hostname` is a syntactically valid RFC-1123 hostname.
///
/// Each dot-separated label must be 1-63 alphanumeric-or-hyphen
/// characters and may not start or end with a hyphen. A single trailing
/// dot (fully-qualified form) is accepted.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    if hostname.is_empty() {
        return false;
    }
    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label_regex().is_match(label)
    })
}

/// Whether `address` can be handed to the scanner at all.
pub fn is_scannable_address(address: &str) -> bool {
    is_valid_ip(address) || is_valid_hostname(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ip_literals() {
        assert!(is_valid_ip("192.168.1.10"));
        assert!(is_valid_ip("::1"));
        assert!(!is_valid_ip("999.1.1.1"));
        assert!(!is_valid_ip("example.com"));
    }

    #[test]
    fn accepts_plain_hostnames() {
        assert!(is_valid_hostname("localhost"));
        assert!(is_valid_hostname("db-01.internal.example.com"));
        assert!(is_valid_hostname("example.com."));
    }

    #[test]
    fn rejects_malformed_hostnames() {
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-leading.example.com"));
        assert!(!is_valid_hostname("trailing-.example.com"));
        assert!(!is_valid_hostname("spaces not allowed"));
        assert!(!is_valid_hostname("under_score.example.com"));
        assert!(!is_valid_hostname(&"a".repeat(256)));
        assert!(!is_valid_hostname(&format!("{}.example.com", "a".repeat(64))));
    }

    #[test]
    fn scannable_accepts_either_form() {
        assert!(is_scannable_address("10.0.0.1"));
        assert!(is_scannable_address("scanme.example.org"));
        assert!(!is_scannable_address("not a target"));
    }
}
