//! `apkscout apps`: list configured apps.

use crate::catalog;
use crate::cli::output;
use anyhow::Result;

pub async fn run(platform: &str) -> Result<()> {
    let root = catalog::catalog_root();
    let names = catalog::list(&root, platform)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "platform": platform,
            "apps": names,
        }));
        return Ok(());
    }

    if names.is_empty() {
        if !output::is_quiet() {
            println!(
                "  No apps configured. Add descriptors under {}",
                root.join("apps").join(platform).display()
            );
        }
        return Ok(());
    }

    for name in names {
        println!("{name}");
    }
    Ok(())
}
