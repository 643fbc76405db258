//! medscan - medication label safety checker
//!
//! Entry point for the backend service.
//!
//! ```text
//! medscan [--port N] [--config FILE]   run the HTTP gateway
//! medscan --sample-config              print an annotated config file
//! medscan --list-models                list Gemini models usable for scanning
//! ```

use anyhow::Context;
use medscan_core::{
    config::{load_config, load_config_from, sample_config},
    GeminiProvider, MedscanConfig,
};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Debug, Default, PartialEq)]
struct Args {
    /// Overrides `server.port`
    port: Option<u16>,
    /// Explicit config file instead of the usual lookup
    config: Option<PathBuf>,
    sample_config: bool,
    list_models: bool,
}

impl Args {
    /// Parse command-line arguments
    fn parse() -> anyhow::Result<Self> {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = args.into_iter();
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--port" | "-p" => {
                    let value = args.next().context("--port needs a value")?;
                    let port = value
                        .parse()
                        .with_context(|| format!("invalid port: {}", value))?;
                    parsed.port = Some(port);
                }
                "--config" | "-c" => {
                    let value = args.next().context("--config needs a path")?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--sample-config" => parsed.sample_config = true,
                "--list-models" => parsed.list_models = true,
                _ => {
                    // Ignore unknown flags
                }
            }
        }

        Ok(parsed)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse()?;

    if args.sample_config {
        print!("{}", sample_config());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config(&std::env::current_dir()?)?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.list_models {
        return list_models(&config);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(medscan_server::run_server(config))
}

/// Print the models that can read label photos
fn list_models(config: &MedscanConfig) -> anyhow::Result<()> {
    let provider = GeminiProvider::from_config(&config.llm)?;
    let models = provider.list_models()?;

    for model in models.iter().filter(|m| m.contains("flash")) {
        println!("{}", model);
    }

    Ok(())
}
