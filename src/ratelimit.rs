//! Sliding-window throttling of login-link requests.
//!
//! Request timestamps per client key live in `data/rate_limits.json`. A
//! check counts the timestamps still inside the window; a hit is recorded
//! only after the mail actually went out, so a delivery failure does not
//! burn an attempt. Histories are truncated to the last `max_requests`
//! entries, which is all a future check can ever need.
//!
//! The client key is derived from proxy headers with [`client_ip`]: the
//! first trusted header carrying a public address wins, otherwise the raw
//! peer address is used.

use crate::datafile::{DataFileError, JsonDocument};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the window, not counting the one being decided.
    pub remaining: u32,
    /// Epoch second at which the window frees up again.
    pub reset_at: i64,
}

type HistoryMap = BTreeMap<String, Vec<i64>>;

#[derive(Debug, Clone)]
pub struct RateLimiter {
    doc: JsonDocument,
    max_requests: u32,
    window: i64,
}

impl RateLimiter {
    pub fn new(doc: JsonDocument, max_requests: u32, window: i64) -> Self {
        Self {
            doc,
            max_requests,
            window,
        }
    }

    /// Decide whether `key` may make a request at `now`. Does not record,
    /// and a key with no live history leaves no trace in the document, so
    /// probing clients cannot grow it.
    pub fn check(&self, key: &str, now: i64) -> Result<RateDecision, DataFileError> {
        let cutoff = now - self.window;
        let max = self.max_requests;
        let window = self.window;
        self.doc.update::<HistoryMap, _, _>(|histories| {
            let decision = match histories.get_mut(key) {
                Some(history) => {
                    history.retain(|&ts| ts > cutoff);
                    let used = history.len() as u32;
                    let reset_at = history
                        .iter()
                        .min()
                        .map(|oldest| oldest + window)
                        .unwrap_or(now + window);
                    RateDecision {
                        allowed: used < max,
                        remaining: max.saturating_sub(used + 1),
                        reset_at,
                    }
                }
                None => RateDecision {
                    allowed: true,
                    remaining: max.saturating_sub(1),
                    reset_at: now + window,
                },
            };
            histories.retain(|_, history| !history.is_empty());
            decision
        })
    }

    /// Record a successful request for `key`: append, prune the expired,
    /// keep at most the last `max_requests` timestamps.
    pub fn record(&self, key: &str, now: i64) -> Result<(), DataFileError> {
        let cutoff = now - self.window;
        let keep = self.max_requests as usize;
        self.doc.update::<HistoryMap, _, _>(|histories| {
            let history = histories.entry(key.to_string()).or_default();
            history.push(now);
            history.sort_unstable();
            history.retain(|&ts| ts > cutoff);
            if history.len() > keep {
                let excess = history.len() - keep;
                history.drain(..excess);
            }
        })
    }

    /// Seconds until the window frees up, zero when not limited.
    pub fn retry_after(&self, key: &str, now: i64) -> Result<i64, DataFileError> {
        let decision = self.check(key, now)?;
        if decision.allowed {
            Ok(0)
        } else {
            Ok((decision.reset_at - now).max(0))
        }
    }
}

/// Headers consulted for the real client address, in trust order.
const IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Best-effort client address behind a reverse proxy.
///
/// Header names are matched case-insensitively. `X-Forwarded-For` may carry
/// a chain; only the first (client) element counts. Private-range values are
/// skipped so a spoofed internal address cannot share a bucket with the
/// proxy itself.
pub fn client_ip(headers: &[(&str, &str)], remote_addr: &str) -> String {
    for wanted in IP_HEADERS {
        for (name, value) in headers {
            if !name.eq_ignore_ascii_case(wanted) {
                continue;
            }
            let candidate = value.split(',').next().unwrap_or("").trim();
            if let Ok(ip) = candidate.parse::<IpAddr>()
                && is_public(&ip)
            {
                return candidate.to_string();
            }
        }
    }
    remote_addr.to_string()
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified())
        }
        IpAddr::V6(v6) => {
            let seg = v6.segments();
            let unique_local = (seg[0] & 0xfe00) == 0xfc00;
            let link_local = (seg[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WINDOW: i64 = 3600;

    fn limiter(tmp: &TempDir) -> RateLimiter {
        RateLimiter::new(JsonDocument::new(tmp.path().join("rate_limits.json")), 3, WINDOW)
    }

    #[test]
    fn remaining_counts_down() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        let mut seen = Vec::new();
        for i in 0..4 {
            let now = 1000 + i;
            let decision = rl.check("1.2.3.4", now).unwrap();
            seen.push((decision.allowed, decision.remaining));
            if decision.allowed {
                rl.record("1.2.3.4", now).unwrap();
            }
        }
        assert_eq!(
            seen,
            vec![(true, 2), (true, 1), (true, 0), (false, 0)]
        );
    }

    #[test]
    fn window_slides() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        for now in [1000, 1001, 1002] {
            rl.record("k", now).unwrap();
        }
        assert!(!rl.check("k", 1003).unwrap().allowed);
        // Oldest hit leaves the window one second after 1000 + WINDOW.
        assert!(rl.check("k", 1000 + WINDOW + 1).unwrap().allowed);
    }

    #[test]
    fn reset_at_tracks_oldest_hit() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        rl.record("k", 1000).unwrap();
        rl.record("k", 2000).unwrap();
        rl.record("k", 3000).unwrap();
        let decision = rl.check("k", 3001).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reset_at, 1000 + WINDOW);
    }

    #[test]
    fn keys_are_independent() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        for now in [1000, 1001, 1002] {
            rl.record("a", now).unwrap();
        }
        assert!(!rl.check("a", 1003).unwrap().allowed);
        assert!(rl.check("b", 1003).unwrap().allowed);
    }

    #[test]
    fn checked_keys_with_no_requests_are_not_persisted() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        for i in 0..100 {
            let decision = rl.check(&format!("2001:db8::{i:x}"), 1000).unwrap();
            assert!(decision.allowed);
        }
        let histories: HistoryMap = JsonDocument::new(tmp.path().join("rate_limits.json"))
            .read()
            .unwrap();
        assert!(histories.is_empty());
    }

    #[test]
    fn fully_expired_key_is_dropped_on_check() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        rl.record("k", 1000).unwrap();
        assert!(rl.check("k", 1000 + WINDOW + 1).unwrap().allowed);
        let histories: HistoryMap = JsonDocument::new(tmp.path().join("rate_limits.json"))
            .read()
            .unwrap();
        assert!(!histories.contains_key("k"));
    }

    #[test]
    fn record_prunes_expired_timestamps() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        rl.record("k", 1000).unwrap();
        rl.record("k", 1000 + WINDOW + 5).unwrap();
        let histories: HistoryMap = JsonDocument::new(tmp.path().join("rate_limits.json"))
            .read()
            .unwrap();
        assert_eq!(histories["k"], vec![1000 + WINDOW + 5]);
    }

    #[test]
    fn history_is_truncated() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        for now in 1000..1010 {
            rl.record("k", now).unwrap();
        }
        let histories: HistoryMap = JsonDocument::new(tmp.path().join("rate_limits.json"))
            .read()
            .unwrap();
        assert_eq!(histories["k"], vec![1007, 1008, 1009]);
    }

    #[test]
    fn retry_after_when_limited() {
        let tmp = TempDir::new().unwrap();
        let rl = limiter(&tmp);
        for now in [1000, 1001, 1002] {
            rl.record("k", now).unwrap();
        }
        assert_eq!(rl.retry_after("k", 1002).unwrap(), WINDOW - 2);
        assert_eq!(rl.retry_after("other", 1002).unwrap(), 0);
    }

    #[test]
    fn client_ip_prefers_cloudflare_header() {
        let headers = [
            ("X-Forwarded-For", "203.0.113.9, 10.0.0.1"),
            ("CF-Connecting-IP", "198.51.100.7"),
        ];
        assert_eq!(client_ip(&headers, "10.0.0.2"), "198.51.100.7");
    }

    #[test]
    fn client_ip_takes_first_forwarded_element() {
        let headers = [("x-forwarded-for", "203.0.113.9, 10.0.0.1, 172.16.0.1")];
        assert_eq!(client_ip(&headers, "10.0.0.2"), "203.0.113.9");
    }

    #[test]
    fn client_ip_skips_private_header_values() {
        let headers = [
            ("x-real-ip", "192.168.1.50"),
            ("x-forwarded-for", "203.0.113.9"),
        ];
        assert_eq!(client_ip(&headers, "10.0.0.2"), "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_remote_addr() {
        let headers = [("x-real-ip", "not-an-ip")];
        assert_eq!(client_ip(&headers, "10.0.0.2"), "10.0.0.2");
    }

    #[test]
    fn public_ip_classification() {
        for private in ["10.0.0.1", "192.168.0.1", "172.16.5.5", "127.0.0.1", "169.254.0.1", "::1", "fe80::1", "fd00::1"] {
            assert!(!is_public(&private.parse().unwrap()), "{private} should be private");
        }
        for public in ["203.0.113.9", "8.8.8.8", "2001:4860:4860::8888"] {
            assert!(is_public(&public.parse().unwrap()), "{public} should be public");
        }
    }
}
