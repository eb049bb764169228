use ci_automation::config::app_config::{AppConfig, ConfigOrigin, LoggingConfig};
use ci_automation::core::etl::exit_code;
use ci_automation::utils::logger;
use ci_automation::{CliConfig, EtlEngine, RecordPipeline, ReqwestTransport};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = CliConfig::parse();

    let loaded = match AppConfig::load(&cli.config, cli.strict) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Logging is normally configured from the file that just failed.
            if logger::init_cli_logger(&LoggingConfig::default(), cli.verbose).is_err() {
                eprintln!("❌ Failed to load configuration: {}", e);
            }
            tracing::error!("❌ Failed to load configuration: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            return ExitCode::from(e.exit_code());
        }
    };

    if let Err(e) = logger::init_cli_logger(&loaded.config.logging, cli.verbose) {
        eprintln!("❌ {}", e);
        return ExitCode::from(e.exit_code());
    }

    tracing::info!("Starting ci-automation");
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }
    match &loaded.origin {
        ConfigOrigin::File(path) => {
            tracing::info!("Configuration loaded from: {}", path.display())
        }
        ConfigOrigin::Defaults => tracing::info!("Using built-in default configuration"),
    }
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let source = match cli.input_source() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("❌ {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    let fail_on_invalid = loaded.config.processing.fail_on_invalid;
    let pipeline = RecordPipeline::new(loaded.config, source, ReqwestTransport::new());
    let engine = EtlEngine::new(pipeline);

    let outcome = engine.run().await;
    match &outcome {
        Ok(result) => {
            match serde_json::to_string_pretty(result) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!("Failed to serialize result: {}", e),
            }
            if result.is_success() {
                tracing::info!("✅ Run completed successfully");
            } else if !fail_on_invalid {
                tracing::warn!("Record failed validation; fail_on_invalid is off, exiting with 0");
            }
        }
        Err(e) => tracing::error!("❌ Run failed: {}", e),
    }

    ExitCode::from(exit_code(&outcome, fail_on_invalid))
}
