//! Session metadata harvested from received records.
//!
//! The controller authenticates with session cookies: once a response sets
//! one, it is replayed on every subsequent request on that connection. The
//! cookie bag is monotonic across the connection's lifetime — later
//! responses overwrite same-named cookies, others persist — and is cleared
//! on teardown, never shared across distinct physical connections.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SET_COOKIE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Set-Cookie:\s*([^=\r\n]+)=([^,;\r\n]*)").expect("static regex")
});

static SERVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Server:\s*([^\r\n]*)").expect("static regex"));

/// Accumulated session state: cookies and the server identity header.
#[derive(Debug, Clone, Default)]
pub struct SessionHeaders {
    cookies: BTreeMap<String, String>,
    server: String,
}

impl SessionHeaders {
    /// Empty session state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a received record for `Set-Cookie: name=value` lines and a
    /// `Server: <value>` line, upserting each cookie into the bag.
    ///
    /// The value of a cookie ends at `,`, `;` or end of line; the key match
    /// is case-insensitive.
    pub fn harvest(&mut self, record: &[u8]) {
        let text = String::from_utf8_lossy(record);

        for capture in SET_COOKIE.captures_iter(&text) {
            let name = capture[1].trim().to_owned();
            let value = capture[2].to_owned();
            self.cookies.insert(name, value);
        }

        if let Some(capture) = SERVER.captures(&text) {
            self.server = capture[1].to_owned();
        }
    }

    /// Renders all accumulated cookies as a single
    /// `Cookie: k1=v1; k2=v2\r\n` line, or an empty string when none are
    /// set.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        if self.cookies.is_empty() {
            return String::new();
        }

        let rendered: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        format!("Cookie: {}\r\n", rendered.join("; "))
    }

    /// The value of one accumulated cookie.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The last observed `Server:` header value.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server
    }

    /// True when no cookies have been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Drops all session state. Called on connection teardown.
    pub fn clear(&mut self) {
        self.cookies.clear();
        self.server.clear();
    }
}
