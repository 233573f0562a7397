use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const SHARE_BASE_URL: &str = "https://github.com/martintrojer/tapr";

/// Timer duration as it travels in the share payload.
///
/// The original file format carries either a number of seconds or the
/// literal string "free"; the untagged representation accepts both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShareDuration {
    Secs(u64),
    Label(String),
}

impl std::fmt::Display for ShareDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShareDuration::Secs(s) => write!(f, "{s}s"),
            ShareDuration::Label(l) => write!(f, "{l}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharePayload {
    pub cps: String,
    pub clicks: u64,
    pub duration: ShareDuration,
    pub best: String,
}

impl SharePayload {
    pub fn new(cps: f64, clicks: u64, duration_secs: u64, best_cps: f64) -> Self {
        let duration = if duration_secs == 0 {
            ShareDuration::Label("free".to_string())
        } else {
            ShareDuration::Secs(duration_secs)
        };
        Self {
            cps: format!("{cps:.2}"),
            clicks,
            duration,
            best: format!("{best_cps:.2}"),
        }
    }

    /// Multi-line summary for the shared-result display.
    pub fn summary(&self) -> String {
        format!(
            "Shared Results:\n\nCPS: {}\nClicks: {}\nDuration: {}\nBest CPS: {}",
            self.cps, self.clicks, self.duration, self.best
        )
    }
}

pub fn encode(payload: &SharePayload) -> String {
    STANDARD.encode(serde_json::to_vec(payload).unwrap_or_default())
}

/// Decode a shared payload; any failure reads as "no payload".
pub fn decode(encoded: &str) -> Option<SharePayload> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub fn share_url(payload: &SharePayload) -> String {
    format!("{SHARE_BASE_URL}?results={}", encode(payload))
}

/// Best-effort: open the share link when a browser is around.
pub fn open_in_browser(url: &str) -> bool {
    webbrowser::Browser::is_available() && webbrowser::open(url).is_ok()
}
