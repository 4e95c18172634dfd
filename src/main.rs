// Copyright 2026 apkscout contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use apkscout::catalog;
use apkscout::cli;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(
    name = "apkscout",
    about = "Resolve app versions on APK mirror sites to exact download links",
    version,
    after_help = "Run 'apkscout <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an app to its final download URL
    Resolve {
        /// App name from the catalog
        app: String,
        /// Catalog platform directory
        #[arg(long, default_value = catalog::DEFAULT_PLATFORM)]
        platform: String,
        /// Exact version to resolve (overrides the descriptor pin)
        #[arg(long)]
        version: Option<String>,
        /// ABI filter (e.g. "arm64-v8a", "universal")
        #[arg(long)]
        arch: Option<String>,
        /// Screen density filter (e.g. "nodpi")
        #[arg(long)]
        dpi: Option<String>,
        /// Build type filter (e.g. "apk", "bundle")
        #[arg(long)]
        build_type: Option<String>,
        /// Accept listing pages on weaker version evidence
        #[arg(long)]
        fuzzy: bool,
    },
    /// Show the newest version published on the mirror
    Latest {
        /// App name from the catalog
        app: String,
        /// Catalog platform directory
        #[arg(long, default_value = catalog::DEFAULT_PLATFORM)]
        platform: String,
    },
    /// Resolve and download in one step
    Download {
        /// App name from the catalog
        app: String,
        /// Catalog platform directory
        #[arg(long, default_value = catalog::DEFAULT_PLATFORM)]
        platform: String,
        /// Exact version to download (overrides the descriptor pin)
        #[arg(long)]
        version: Option<String>,
        /// ABI filter (e.g. "arm64-v8a", "universal")
        #[arg(long)]
        arch: Option<String>,
        /// Screen density filter (e.g. "nodpi")
        #[arg(long)]
        dpi: Option<String>,
        /// Build type filter (e.g. "apk", "bundle")
        #[arg(long)]
        build_type: Option<String>,
        /// Accept listing pages on weaker version evidence
        #[arg(long)]
        fuzzy: bool,
        /// Destination file (defaults to <app>-<version>-<arch>.apk)
        #[arg(long, short)]
        output: Option<String>,
    },
    /// List configured apps
    Apps {
        /// Catalog platform directory
        #[arg(long, default_value = catalog::DEFAULT_PLATFORM)]
        platform: String,
    },
    /// Check environment and catalog health
    Doctor {
        /// Catalog platform directory
        #[arg(long, default_value = catalog::DEFAULT_PLATFORM)]
        platform: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Mirror global flags into environment variables so all modules can
    // check them without plumbing.
    if cli.json {
        std::env::set_var("APKSCOUT_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("APKSCOUT_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("APKSCOUT_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("APKSCOUT_NO_COLOR", "1");
    }

    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            app,
            platform,
            version,
            arch,
            dpi,
            build_type,
            fuzzy,
        } => {
            cli::resolve_cmd::run(
                &app,
                &platform,
                version.as_deref(),
                arch.as_deref(),
                dpi.as_deref(),
                build_type.as_deref(),
                fuzzy,
            )
            .await
        }
        Commands::Latest { app, platform } => cli::latest_cmd::run(&app, &platform).await,
        Commands::Download {
            app,
            platform,
            version,
            arch,
            dpi,
            build_type,
            fuzzy,
            output,
        } => {
            cli::download_cmd::run(
                &app,
                &platform,
                version.as_deref(),
                arch.as_deref(),
                dpi.as_deref(),
                build_type.as_deref(),
                fuzzy,
                output.as_deref(),
            )
            .await
        }
        Commands::Apps { platform } => cli::apps_cmd::run(&platform).await,
        Commands::Doctor { platform } => cli::doctor::run(&platform).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "apkscout", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}

/// Logs go to stderr so stdout stays clean for URLs and paths.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose {
        "apkscout=debug"
    } else {
        "apkscout=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
