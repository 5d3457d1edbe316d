use std::env;

/// Read a boolean switch from the environment variable `name`.
///
/// Unset or unrecognised values give `default`. The gateway's own `Y`/`N` spellings are accepted too.
pub fn env_flag(name: &str, default: bool) -> bool {
    env::var(name).ok().as_deref().and_then(parse_flag).unwrap_or(default)
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
