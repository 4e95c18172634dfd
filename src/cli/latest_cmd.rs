//! `apkscout latest`: report the newest version published on the mirror.

use crate::catalog;
use crate::cli::output;
use crate::cli::resolve_cmd::build_resolver;
use anyhow::Result;

pub async fn run(app: &str, platform: &str) -> Result<()> {
    let root = catalog::catalog_root();
    let descriptor = catalog::load(&root, platform, app)?;
    let query = descriptor.to_query();

    let resolver = build_resolver(false, None);
    let version = resolver.resolve_latest_version(&query).await?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "app": query.app,
            "latest": version,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        print!("  {}: ", query.app);
    }
    println!("{version}");
    Ok(())
}
