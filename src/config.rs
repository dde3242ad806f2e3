use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Presentation switches applied at the HTTP boundary only.
/// The engine always computes full aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub hide_share_awards: bool,
    pub hide_solo_section: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            hide_share_awards: true,
            hide_solo_section: true,
        }
    }
}

/// Configuration for the viewer service
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub bind_addr: String,
    /// URL or file path loaded in the background at startup
    pub auto_load: Option<String>,
    /// Root for `/load` file paths; unset refuses them
    pub log_dir: Option<PathBuf>,
    /// Whether `/load` may fetch `http(s)://` URLs
    pub allow_remote: bool,
    pub fetch_timeout: Duration,
    pub view: ViewOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            auto_load: None,
            log_dir: None,
            allow_remote: false,
            fetch_timeout: Duration::from_secs(30),
            view: ViewOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by `QUIZLOG_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let fetch_timeout = match lookup("QUIZLOG_FETCH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    warn!(value = %raw, "Ignoring invalid QUIZLOG_FETCH_TIMEOUT_SECS");
                    defaults.fetch_timeout
                }
            },
            None => defaults.fetch_timeout,
        };

        let show = |key: &str| lookup(key).map(|raw| parse_flag(&raw)).unwrap_or(false);

        Self {
            bind_addr: lookup("QUIZLOG_BIND").unwrap_or(defaults.bind_addr),
            auto_load: lookup("QUIZLOG_AUTO_LOAD").filter(|location| !location.trim().is_empty()),
            log_dir: lookup("QUIZLOG_LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            allow_remote: show("QUIZLOG_ALLOW_REMOTE"),
            fetch_timeout,
            view: ViewOptions {
                hide_share_awards: !show("QUIZLOG_SHOW_SHARE_AWARDS"),
                hide_solo_section: !show("QUIZLOG_SHOW_SOLO"),
            },
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
