//! Version hints from external tools.
//!
//! A descriptor may name a command that prints the newest upstream version
//! (store scrapers, vendor APIs). The tool contract is line-oriented: the
//! last non-empty stdout line is taken as the version. Hint failures never
//! fail a resolution; the caller falls through to site discovery.

use crate::catalog::{AppDescriptor, HintTool};
use crate::events::{emit, EventSender, ResolveEvent};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Ask the app's hint tool for the newest version.
///
/// The tool comes from the descriptor, else from `APKSCOUT_HINT_TOOL`.
/// The descriptor's package id is appended as the final argument. Any
/// failure (missing tool, nonzero exit, empty output) logs a warning and
/// yields `None`.
pub fn version_from_tool(descriptor: &AppDescriptor, events: &Option<EventSender>) -> Option<String> {
    let tool = tool_spec(descriptor)?;
    let program = resolve_program(&tool.command)?;

    let mut cmd = Command::new(&program);
    cmd.args(&tool.args);
    if let Some(package) = &descriptor.package {
        cmd.arg(package);
    }

    debug!(app = %descriptor.name, tool = %program.display(), "running version-hint tool");
    let output = match cmd.output() {
        Ok(o) => o,
        Err(e) => {
            warn!(app = %descriptor.name, tool = %program.display(), error = %e,
                  "version-hint tool failed to start");
            return None;
        }
    };

    if !output.status.success() {
        warn!(app = %descriptor.name, tool = %program.display(), status = %output.status,
              "version-hint tool exited nonzero");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
        .map(str::to_string);

    match &version {
        Some(v) => {
            debug!(app = %descriptor.name, version = %v, "version hint obtained");
            emit(
                events,
                ResolveEvent::HintVersionFound {
                    app: descriptor.name.clone(),
                    version: v.clone(),
                },
            );
        }
        None => warn!(app = %descriptor.name, "version-hint tool printed nothing usable"),
    }
    version
}

/// The tool to run: descriptor first, then the env override.
fn tool_spec(descriptor: &AppDescriptor) -> Option<HintTool> {
    if let Some(tool) = &descriptor.hint_tool {
        return Some(tool.clone());
    }
    match std::env::var("APKSCOUT_HINT_TOOL") {
        Ok(cmd) if !cmd.is_empty() => Some(HintTool {
            command: cmd,
            args: Vec::new(),
        }),
        _ => None,
    }
}

/// Path-qualified commands are taken as-is; bare names are looked up on
/// PATH.
fn resolve_program(command: &str) -> Option<PathBuf> {
    let candidate = PathBuf::from(command);
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return Some(candidate);
    }
    match which::which(command) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(tool = command, error = %e, "version-hint tool not found on PATH");
            None
        }
    }
}
