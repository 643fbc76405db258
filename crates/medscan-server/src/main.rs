//! medscan server binary
//!
//! Standalone entry point - loads config from the working directory and
//! delegates to lib.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = medscan_core::load_config(&cwd)?;

    medscan_server::run_server(config).await
}
