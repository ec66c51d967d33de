use anyhow::Context;
use clap::Parser;
use influx_reporter::adapters::line_protocol;
use influx_reporter::core::stats_mapper;
use influx_reporter::utils::{error::ErrorSeverity, logger, validation::Validate};
use influx_reporter::{replay, CliConfig, EventBus, InfluxDbReporter, ReporterConfig, RunLog};

fn load_run(config: &CliConfig) -> anyhow::Result<RunLog> {
    let run = match &config.input {
        Some(path) => {
            tracing::info!("📁 Loading run from: {}", path);
            RunLog::from_file(path).with_context(|| format!("failed to load run from '{}'", path))?
        }
        None => {
            tracing::info!("📁 Reading run from stdin");
            RunLog::from_reader(std::io::stdin().lock()).context("failed to read run from stdin")?
        }
    };
    Ok(run)
}

fn print_dry_run(reporter_config: &ReporterConfig, run: &RunLog) -> anyhow::Result<()> {
    let plugin = reporter_config.plugin()?;
    tracing::info!("🔍 DRY RUN MODE - nothing will be written to InfluxDB");

    for report in &run.intermediate {
        let point = stats_mapper::build_point(report, &plugin.tags);
        println!("{}", line_protocol::encode_point(&point)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting influx-reporter");
    tracing::info!("📁 Loading configuration from: {}", config.config);

    let reporter_config = match ReporterConfig::from_file(&config.config) {
        Ok(reporter_config) => reporter_config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", config.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = reporter_config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    let run = load_run(&config)?;
    tracing::info!("📊 Run holds {} stats report(s)", run.len());

    if config.dry_run {
        return print_dry_run(&reporter_config, &run);
    }

    let bus = EventBus::new();
    let reporter = match InfluxDbReporter::new(&reporter_config, &bus) {
        Ok(reporter) => reporter,
        Err(e) => {
            tracing::error!(
                "❌ Could not start reporter: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    replay(&run, &bus, config.interval()).await;
    drop(bus);

    let summary = reporter.join().await?;
    tracing::info!(
        "✅ Forwarded {} point(s), {} failed",
        summary.written,
        summary.failed
    );
    println!("✅ Forwarded {} point(s), {} failed", summary.written, summary.failed);

    if summary.failed > 0 {
        // 寫入失敗屬於可重試錯誤
        std::process::exit(ErrorSeverity::Medium.exit_code());
    }

    Ok(())
}
