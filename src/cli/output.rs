//! Shared output helpers for CLI commands.
//!
//! Global flags are mirrored into `APKSCOUT_*` environment variables by
//! `main` so every command can consult them without threading flags
//! through each call.

use serde_json::Value;

fn flag(name: &str) -> bool {
    std::env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Whether `--json` was passed.
pub fn is_json() -> bool {
    flag("APKSCOUT_JSON")
}

/// Whether `--quiet` was passed.
pub fn is_quiet() -> bool {
    flag("APKSCOUT_QUIET")
}

/// Whether colored/animated output should be suppressed.
pub fn no_color() -> bool {
    flag("APKSCOUT_NO_COLOR") || std::env::var("NO_COLOR").is_ok()
}

/// Print a JSON value to stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(_) => println!("{value}"),
    }
}
