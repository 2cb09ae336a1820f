use clap::Parser;
use toggl_reports::utils::error::ReportError;
use toggl_reports::utils::logger::{self, LogFormat};
use toggl_reports::utils::validation::Validate;
use toggl_reports::{AppConfig, CliConfig, LocalStorage, ReportEngine, RunOptions, TogglClient};

fn exit_with(e: &ReportError) -> ! {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_logger(LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::info!("Starting toggl-reports");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // bad month/year aborts before any request is made
    let range = cli.month_range().unwrap_or_else(|e| exit_with(&e));

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let mut config = AppConfig::from_file(&cli.config).unwrap_or_else(|e| {
        eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
        eprintln!("💡 Make sure the file exists and is valid TOML format");
        std::process::exit(1);
    });

    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
        tracing::info!("🔧 Output directory overridden to: {}", output);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let options = RunOptions {
        check: config.checks.enabled || cli.check_only,
        export_findings: config.checks.export_csv,
        download: !cli.check_only,
    };

    let settings = config.api_settings().unwrap_or_else(|e| exit_with(&e));
    let client = TogglClient::new(settings).unwrap_or_else(|e| exit_with(&e));
    let storage = LocalStorage::new(config.output_path());
    let checker = config.checker().unwrap_or_else(|e| exit_with(&e));
    let engine =
        ReportEngine::new(client, storage, config.naming(), checker).with_options(options);

    match engine.run(&range).await {
        Ok(summary) => {
            for path in &summary.saved_paths {
                println!("📁 {}", path);
            }
            if summary.findings.is_empty() {
                println!("✅ Reports for {} done", range);
            } else {
                println!(
                    "⚠️  Reports for {} done with {} warning(s)",
                    range,
                    summary.findings.len()
                );
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
