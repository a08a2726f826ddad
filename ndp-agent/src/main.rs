use clap::Parser;
use ndp_agent::{Config, core::commands, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env) then CLI/env configuration
    dotenv::dotenv().ok();
    let config = Config::parse();

    // 2. Logging
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    // 3. Run the selected command
    if let Err(e) = commands::execute(&config).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
