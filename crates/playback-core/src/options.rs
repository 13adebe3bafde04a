// crates/playback-core/src/options.rs
//
// Per-open configuration surface: a flat string map mirroring the key=value
// option dictionaries the demuxer itself accepts. The engine interprets a
// handful of keys and forwards everything else untouched.

use std::collections::HashMap;

use crate::limits::{DEFAULT_RECONNECT_DELAY_MAX_SECS, M3U8_PROTOCOL_WHITELIST};

/// Open-time options for a single `open()` call.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    values: HashMap<String, String>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconnect enabled, streamed, max 5s backoff — the engine's defaults
    /// before the caller's options are merged in.
    pub fn with_reconnect_defaults() -> Self {
        let mut opts = Self::new();
        opts.set("reconnect", "1");
        opts.set("reconnect_streamed", "1");
        opts.set(
            "reconnect_delay_max",
            &DEFAULT_RECONNECT_DELAY_MAX_SECS.to_string(),
        );
        opts
    }

    /// Builds the options a given `open(url, ...)` call should use: engine
    /// defaults, the caller's overrides, and — if the URL names an HLS
    /// playlist — a restricted protocol whitelist.
    pub fn resolve(url: &str, caller: Option<&HashMap<String, String>>) -> Self {
        let mut opts = Self::with_reconnect_defaults();
        if url.contains("m3u8") {
            opts.set("protocol_whitelist", M3U8_PROTOCOL_WHITELIST);
        }
        if let Some(caller) = caller {
            for (k, v) in caller {
                opts.set(k, v);
            }
        }
        opts
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The restricted set of protocols the demuxer may follow (set for HLS
    /// sources by `resolve`), if one was configured.
    pub fn protocol_whitelist(&self) -> Option<&str> {
        self.get("protocol_whitelist")
    }

    /// Whether the demuxer should retry a dropped connection. Defaults to
    /// `true` to match `with_reconnect_defaults`; any value other than the
    /// literal `"0"` counts as enabled.
    pub fn reconnect(&self) -> bool {
        self.get("reconnect").map(|v| v != "0").unwrap_or(true)
    }

    /// Whether reconnect also applies to sources already identified as
    /// streamed (as opposed to a single finite download).
    pub fn reconnect_streamed(&self) -> bool {
        self.get("reconnect_streamed")
            .map(|v| v != "0")
            .unwrap_or(true)
    }

    /// Maximum backoff between reconnect attempts, in seconds. Falls back
    /// to the engine default if unset or unparseable.
    pub fn reconnect_delay_max(&self) -> u32 {
        self.get("reconnect_delay_max")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RECONNECT_DELAY_MAX_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_reconnect() {
        let opts = OpenOptions::with_reconnect_defaults();
        assert_eq!(opts.get("reconnect"), Some("1"));
        assert_eq!(opts.get("reconnect_streamed"), Some("1"));
        assert_eq!(opts.get("reconnect_delay_max"), Some("5"));
    }

    #[test]
    fn m3u8_url_restricts_protocol_whitelist() {
        let opts = OpenOptions::resolve("https://example.com/live.m3u8", None);
        assert_eq!(
            opts.get("protocol_whitelist"),
            Some(M3U8_PROTOCOL_WHITELIST)
        );
    }

    #[test]
    fn non_hls_url_has_no_protocol_whitelist() {
        let opts = OpenOptions::resolve("file.mp4", None);
        assert_eq!(opts.get("protocol_whitelist"), None);
    }

    #[test]
    fn caller_options_override_defaults() {
        let mut caller = HashMap::new();
        caller.insert("reconnect".to_string(), "0".to_string());
        let opts = OpenOptions::resolve("file.mp4", Some(&caller));
        assert_eq!(opts.get("reconnect"), Some("0"));
    }

    #[test]
    fn typed_accessors_reflect_reconnect_defaults() {
        let opts = OpenOptions::with_reconnect_defaults();
        assert!(opts.reconnect());
        assert!(opts.reconnect_streamed());
        assert_eq!(opts.reconnect_delay_max(), DEFAULT_RECONNECT_DELAY_MAX_SECS);
    }

    #[test]
    fn typed_accessors_respect_caller_overrides() {
        let mut caller = HashMap::new();
        caller.insert("reconnect".to_string(), "0".to_string());
        caller.insert("reconnect_delay_max".to_string(), "30".to_string());
        let opts = OpenOptions::resolve("file.mp4", Some(&caller));
        assert!(!opts.reconnect());
        assert_eq!(opts.reconnect_delay_max(), 30);
    }

    #[test]
    fn protocol_whitelist_accessor_matches_hls_resolution() {
        let opts = OpenOptions::resolve("https://example.com/live.m3u8", None);
        assert_eq!(opts.protocol_whitelist(), Some(M3U8_PROTOCOL_WHITELIST));
        let opts = OpenOptions::resolve("file.mp4", None);
        assert_eq!(opts.protocol_whitelist(), None);
    }

    #[test]
    fn reconnect_delay_max_falls_back_on_unparseable_value() {
        let mut opts = OpenOptions::new();
        opts.set("reconnect_delay_max", "not-a-number");
        assert_eq!(opts.reconnect_delay_max(), DEFAULT_RECONNECT_DELAY_MAX_SECS);
    }
}
