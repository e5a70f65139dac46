use anyhow::{Context, Result};
use release_board::config::{Config, Credentials};
use release_board::jira::rest::JiraRest;
use release_board::pipeline::{self, RunOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

struct Args {
    config: PathBuf,
    dry_run: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: PathBuf::from(DEFAULT_CONFIG),
        dry_run: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dry-run" => args.dry_run = true,
            "--config" => {
                let path = iter.next().context("--config requires a path")?;
                args.config = PathBuf::from(path);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("release_board=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let config = Config::load(&args.config)?;
    info!(
        config = %args.config.display(),
        products = config.products.len(),
        profile = ?config.render.profile,
        "config loaded"
    );

    // Load saved secrets from .env (real env vars take precedence)
    Config::load_env_file();
    let credentials = Credentials::from_env()?;

    let client = JiraRest::new(&config.jira, &credentials)?;
    let options = RunOptions {
        dry_run: args.dry_run,
        ..RunOptions::default()
    };

    let outcome = pipeline::run(&config, &client, &config.page.template, options).await?;
    println!("{}: {}", config.page.template.display(), outcome);
    Ok(())
}
