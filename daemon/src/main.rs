use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use salis_common::{
    config::VERSION,
    time::{get_current_time_in_seconds, ManualClock},
    token::{SharedTokenService, TokenService},
};
use salis_daemon::{
    batch::{build_report, run_steps, Step},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Config::parse();
    let config = if let Some(path) = cli.config_file.as_ref() {
        if cli.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&cli).context("Error while serializing config file")?;
            file.write_all(json.as_bytes()).context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        let file = File::open(path).context("Error while opening config file")?;
        let mut loaded: Config =
            serde_json::from_reader(BufReader::new(file)).context("Error while reading config file")?;
        // Runtime flags are never stored in the file
        loaded.batch = cli.batch.clone();
        loaded.output = cli.output.clone();
        loaded
    } else if cli.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        return Ok(());
    } else {
        cli
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_filter().as_str()),
    )
    .init();

    info!("Salis Daemon v{}", VERSION);
    config.validate()?;

    let steps: Vec<Step> = match config.batch.as_ref() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Error while opening batch file {}", path))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Error while reading batch file {}", path))?
        }
        None => Vec::new(),
    };

    let start = config.start_time.unwrap_or_else(get_current_time_in_seconds);
    let clock = ManualClock::new(start);
    let owner = config.token.owner();
    let (service, deployment) = TokenService::new(config.token.params(), owner, clock.clone())
        .context("Error while deploying the token ledger")?;
    info!("Ledger deployed at {} with owner {}", start, owner);

    let service = SharedTokenService::new(service);
    let reports = run_steps(&service, &clock, &steps).await;
    let report = build_report(&service, deployment, &steps, reports).await;

    let json = serde_json::to_string_pretty(&report).context("Error while serializing report")?;
    match config.output.as_ref() {
        Some(path) => {
            let mut file = File::create(path).context("Error while creating report file")?;
            file.write_all(json.as_bytes()).context("Error while writing report file")?;
            info!("Report written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
