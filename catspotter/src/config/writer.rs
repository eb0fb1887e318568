//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let user_agent = config.environment.user_agent.as_deref().unwrap_or("");

    format!(
        r#"[acquisition]
; Strategy for `catspotter locate --single` requests.
; Prefer GPS over WiFi/cell positioning (default: true)
high_accuracy = {}
; Request deadline in milliseconds (default: 30000)
timeout_ms = {}
; Oldest cached fix that may be reused, in milliseconds (default: 60000)
; 0 always asks for a fresh fix
max_cached_age_ms = {}

[environment]
; Runtime classification used for message wording and the retry cascade:
;   auto       - classify from user_agent (desktop if empty)
;   desktop    - single high-accuracy request
;   mobile     - high-accuracy request, then a low-accuracy retry
;   ios_safari - mobile, with iOS Settings instructions on denial
profile = {}
; Browser user-agent string classified when profile = auto
user_agent = {}

[gpsd]
; gpsd daemon address (default: 127.0.0.1:2947)
host = {}
port = {}
; TCP connect timeout in milliseconds (default: 5000)
connect_timeout_ms = {}

[permission]
; When permission state cannot be queried directly, issue a short
; position request to find out. This may show an OS permission prompt.
provoke_prompt = {}

[logging]
; Log file path, truncated at the start of every run
file = {}
"#,
        config.acquisition.high_accuracy,
        config.acquisition.timeout_ms,
        config.acquisition.max_cached_age_ms,
        config.environment.profile,
        user_agent,
        config.gpsd.host,
        config.gpsd.port,
        config.gpsd.connect_timeout_ms,
        config.permission.provoke_prompt,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
