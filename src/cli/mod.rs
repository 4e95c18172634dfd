//! CLI subcommand implementations for the apkscout binary.

pub mod apps_cmd;
pub mod doctor;
pub mod download_cmd;
pub mod latest_cmd;
pub mod output;
pub mod resolve_cmd;
