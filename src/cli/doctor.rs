//! Environment readiness check.

use crate::catalog;
use anyhow::Result;

/// Check the catalog root, descriptor health, and hint tools.
pub async fn run(platform: &str) -> Result<()> {
    println!("apkscout doctor");
    println!("===============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    let root = catalog::catalog_root();
    let mut healthy = true;

    if root.exists() {
        println!("[OK] Catalog root: {}", root.display());
    } else {
        healthy = false;
        println!("[!!] Catalog root missing: {}", root.display());
    }

    let platform_dir = root.join("apps").join(platform);
    let names = catalog::list(&root, platform).unwrap_or_default();
    if names.is_empty() {
        healthy = false;
        println!("[!!] No app descriptors under {}", platform_dir.display());
    } else {
        println!(
            "[OK] {} app descriptor(s) under {}",
            names.len(),
            platform_dir.display()
        );
    }

    let mut broken = 0usize;
    for name in &names {
        match catalog::load(&root, platform, name) {
            Ok(descriptor) => {
                println!("[OK] {name}: org '{}'", descriptor.org);
                if let Some(tool) = &descriptor.hint_tool {
                    check_hint_tool(name, &tool.command);
                }
            }
            Err(e) => {
                broken += 1;
                println!("[!!] {name}: {e:#}");
            }
        }
    }
    if broken > 0 {
        healthy = false;
    }

    println!();
    if healthy {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!(
            "  Create {} and add at least one app descriptor.",
            platform_dir.display()
        );
    }
    Ok(())
}

/// Hint tools are optional at runtime, so a missing one is informational.
fn check_hint_tool(app: &str, command: &str) {
    let candidate = std::path::Path::new(command);
    let found = if candidate.is_absolute() || candidate.components().count() > 1 {
        candidate.exists()
    } else {
        which::which(command).is_ok()
    };
    if found {
        println!("[OK] {app}: hint tool '{command}' found");
    } else {
        println!("[??] {app}: hint tool '{command}' not found (hints will be skipped)");
    }
}
