use anyhow::Context;
use api_fanout::utils::{logger, validation::Validate};
use api_fanout::{CliConfig, FanoutEngine, FanoutError};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting api-fanout");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        exit_with(e, "Configuration validation failed");
    }

    let engine = match FanoutEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => exit_with(e, "Failed to prepare the endpoint catalog"),
    };

    let (result, summary) = engine.run_with_summary().await;

    let output = if config.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("serializing the aggregate result")?;
    println!("{}", output);

    tracing::info!(
        "{}/{} endpoints succeeded in {}ms",
        summary.succeeded,
        summary.total,
        summary.elapsed_ms
    );

    // failed endpoints are data in the output, not a process failure
    Ok(())
}

fn exit_with(error: FanoutError, context: &str) -> ! {
    tracing::error!(
        "{}: {} (Category: {:?}, Severity: {:?})",
        context,
        error,
        error.category(),
        error.severity()
    );
    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 {}", error.recovery_suggestion());
    std::process::exit(error.exit_code());
}
