use std::env;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_SPORTSDB_URL: &str = "https://www.thesportsdb.com/api/v1/json/123";
pub const DEFAULT_FLAG_CDN_URL: &str = "https://flagcdn.com";

/// Runtime endpoints and worker sizing, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_url: String,
    pub sportsdb_url: String,
    pub flag_cdn_url: String,
    pub http_timeout: Duration,
    pub fetch_parallelism: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            sportsdb_url: DEFAULT_SPORTSDB_URL.to_string(),
            flag_cdn_url: DEFAULT_FLAG_CDN_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            fetch_parallelism: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't have to touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let backend_url = non_empty(lookup("BACKEND_API_URL"))
            .or_else(|| non_empty(lookup("NEXT_PUBLIC_API_URL")))
            .map(|url| trim_base_url(&url))
            .unwrap_or(defaults.backend_url);
        let sportsdb_url = non_empty(lookup("SPORTSDB_API_URL"))
            .map(|url| trim_base_url(&url))
            .unwrap_or(defaults.sportsdb_url);
        let flag_cdn_url = non_empty(lookup("FLAG_CDN_URL"))
            .map(|url| trim_base_url(&url))
            .unwrap_or(defaults.flag_cdn_url);
        let timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(10)
            .clamp(2, 60);
        let fetch_parallelism = lookup("FETCH_PARALLELISM")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(2, 16);

        Self {
            backend_url,
            sportsdb_url,
            flag_cdn_url,
            http_timeout: Duration::from_secs(timeout_secs),
            fetch_parallelism,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn backend_url_falls_back_to_next_public_alias_and_drops_trailing_slash() {
        let cfg = Config::from_lookup(lookup_from(&[(
            "NEXT_PUBLIC_API_URL",
            "https://api.example.com/",
        )]));
        assert_eq!(cfg.backend_url, "https://api.example.com");

        let cfg = Config::from_lookup(lookup_from(&[
            ("BACKEND_API_URL", "http://10.0.0.2:9000"),
            ("NEXT_PUBLIC_API_URL", "https://ignored.example.com"),
        ]));
        assert_eq!(cfg.backend_url, "http://10.0.0.2:9000");
    }

    #[test]
    fn numeric_settings_are_clamped() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("HTTP_TIMEOUT_SECS", "0"),
            ("FETCH_PARALLELISM", "500"),
        ]));
        assert_eq!(cfg.http_timeout, Duration::from_secs(2));
        assert_eq!(cfg.fetch_parallelism, 16);

        let cfg = Config::from_lookup(lookup_from(&[("HTTP_TIMEOUT_SECS", "nope")]));
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
    }
}
