use hubwatch::analysis::AnalysisEngine;
use hubwatch::cli::{Cli, Commands, ConfigAction};
use hubwatch::config::Config;
use hubwatch::error::{HubwatchError, Result};
use hubwatch::ingest::Ingestor;
use hubwatch::monitor::{ConsoleAlertSink, Monitor};
use hubwatch::patterns::PatternTable;
use hubwatch::report;
use hubwatch::store::EventLog;
use hubwatch::transport::DeviceClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Watch {
            device,
            log_file,
            interval,
        } => {
            cmd_watch(cli.config, device, log_file, interval)?;
        }
        Commands::Analyze {
            log_file,
            json,
            output,
        } => {
            cmd_analyze(cli.config, log_file, json, output)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "hubwatch=debug"
    } else {
        "hubwatch=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_watch(
    config_path: Option<PathBuf>,
    device: Option<String>,
    log_file: Option<PathBuf>,
    interval: Option<u64>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    // CLI overrides take precedence over the config file
    if let Some(device) = device {
        config.device.address = device;
    }
    if let Some(log_file) = log_file {
        config.storage.log_file = log_file;
    }
    if let Some(interval) = interval {
        if interval == 0 {
            return Err(HubwatchError::InvalidConfigValue {
                path: "device.poll_interval_secs".to_string(),
                message: "Poll interval must be at least 1 second".to_string(),
            });
        }
        config.device.poll_interval_secs = interval;
    }

    let patterns = Arc::new(PatternTable::compile(&config.patterns)?);
    let log_path = expand_path(&config.storage.log_file)?;
    let log = EventLog::open(log_path)?;
    let ingestor = Ingestor::new(log, patterns)?;
    let client = DeviceClient::new(
        config.device.address.clone(),
        Duration::from_secs(config.device.request_timeout_secs),
    )?;

    println!("Starting hubwatch");
    println!("  Gateway: {}", config.device.address);
    println!("  Log file: {}", config.storage.log_file.display());
    println!(
        "  Polling interval: {} seconds",
        config.device.poll_interval_secs
    );
    println!("  Press Ctrl+C to stop\n");

    let monitor = Monitor::new(
        client,
        ingestor,
        Duration::from_secs(config.device.poll_interval_secs),
        ConsoleAlertSink,
    );

    let rt = tokio::runtime::Runtime::new().map_err(|e| HubwatchError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    rt.block_on(monitor.run())
}

fn cmd_analyze(
    config_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;

    let log_path = expand_path(&log_file.unwrap_or_else(|| config.storage.log_file.clone()))?;
    let log = EventLog::open(log_path.clone())?;
    let records = log.load()?;
    tracing::info!("Loaded {} events from {}", records.len(), log_path.display());

    let patterns = Arc::new(PatternTable::compile(&config.patterns)?);
    let engine = AnalysisEngine::new(config.analysis.clone(), patterns);
    let summary = engine.analyze(&records);

    print!("{}", report::render_text(&summary));

    if json {
        let export_path = output.unwrap_or_else(|| report::export_path(&log_path));
        report::export_json(&summary, &export_path)?;
        println!("\nSummary exported to: {}", export_path.display());
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| HubwatchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {}", parent.display()),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'hubwatch config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}

fn expand_path(path: &std::path::Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| HubwatchError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| HubwatchError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
