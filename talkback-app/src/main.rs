use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use talkback_aggregator::{AggregateError, Aggregator};
use talkback_common::observability::{init_logging, LogConfig, LogFormat};
use talkback_common::TalkbackError;
use talkback_config::{TalkbackConfig, TalkbackConfigLoader};

mod cli;

fn load_config(args: &cli::Cli) -> talkback_common::Result<TalkbackConfig> {
    // Env wins over the file
    let mut cfg = TalkbackConfigLoader::new()
        .with_optional_file(&args.config)
        .load()
        .map_err(|e| TalkbackError::Config(format!("{}: {e}", args.config.display())))?;
    args.apply(&mut cfg);
    Ok(cfg)
}

fn start_logging(cfg: &TalkbackConfig) -> talkback_common::Result<PathBuf> {
    let path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: LogFormat::from_name(&cfg.logging.format),
        ..LogConfig::default()
    })?;
    Ok(path)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    let cfg = load_config(&args)?;
    let log_path = start_logging(&cfg)?;

    let aggregator = match Aggregator::from_config(&cfg) {
        Ok(aggregator) => aggregator,
        Err(AggregateError::NotConfigured) => {
            eprintln!("{}", AggregateError::NotConfigured);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(url = %args.url, log = %log_path.display(), "talkback.start");
    let report = aggregator.interpret(&args.url).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", cli::render_text(&report));
    }
    Ok(ExitCode::SUCCESS)
}
