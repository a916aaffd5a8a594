// # dns-exporter
//
// One-shot exporter: reads every zone of the enabled DNS providers, writes
// one zonefile per zone below the data directory and records the result as
// a git commit.
//
// This binary is a thin integration layer:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering providers
// 4. Preparing the snapshot repository, running fetch and export, committing
//
// ## Configuration
//
// ### Export
// - `DATA_DIR`: Export tree and repository workdir (default `./data`)
// - `DELAY`: Seconds between two zones of one provider (default 1; 0 means 1)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ### Cloudflare
// - `CLOUDFLARE_ENABLED`: Enable the provider
// - `CLOUDFLARE_EMAIL`: Account email
// - `CLOUDFLARE_TOKEN`: Global API key
//
// ### Route53
// - `ROUTE53_ENABLED`: Enable the provider
// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`: Credentials
// - `AWS_SESSION_TOKEN`: Session token (optional)
//
// ### Git Remote
// - `GIT_REMOTE_ENABLED`: Clone/pull before and push after the export
// - `GIT_URL`: `https://host.tld/owner/repo.git`
// - `GIT_BRANCH`: Branch (default master)
// - `GIT_USER`, `GIT_EMAIL`: Commit author, `GIT_USER` also authenticates
// - `GIT_TOKEN`: Access token
//
// ## Example
//
// ```bash
// export CLOUDFLARE_ENABLED=true
// export CLOUDFLARE_EMAIL=ops@example.com
// export CLOUDFLARE_TOKEN=your_key
// export DELAY=2
//
// dns-exporter
// ```

use anyhow::{Context, Result};
use chrono::Utc;
use dns_exporter_core::config::{DEFAULT_AUTHOR_EMAIL, DEFAULT_AUTHOR_NAME, DEFAULT_BRANCH};
use dns_exporter_core::{
    DnsProvider, ExportConfig, Exporter, ExporterConfig, OsFilesystem, ProviderConfig,
    ProviderRegistry, RemoteConfig, SnapshotConfig, SnapshotManager,
};
use dns_exporter_git::GitRepository;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Export and snapshot succeeded (a no-op commit included)
/// - 1: Configuration or startup error
/// - 2: Runtime error (a provider phase or a snapshot step failed)
#[derive(Debug, Clone, Copy)]
enum ExporterExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ExporterExitCode> for ExitCode {
    fn from(code: ExporterExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    exporter: ExporterConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let required = |name: &str| {
            var(name).with_context(|| format!("missing environment variable {}", name))
        };
        let flag = |name: &str| -> Result<bool> {
            match var(name) {
                None => Ok(false),
                Some(v) => parse_bool(&v)
                    .with_context(|| format!("{} must be a boolean, got '{}'", name, v)),
            }
        };

        let mut providers = Vec::new();
        if flag("CLOUDFLARE_ENABLED")? {
            providers.push(ProviderConfig::Cloudflare {
                email: required("CLOUDFLARE_EMAIL")?,
                api_key: required("CLOUDFLARE_TOKEN")?,
            });
        }
        if flag("ROUTE53_ENABLED")? {
            providers.push(ProviderConfig::Route53 {
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                session_token: var("AWS_SESSION_TOKEN"),
            });
        }

        let delay_secs = match var("DELAY") {
            None => 0,
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("DELAY must be a whole number of seconds, got '{}'", v))?,
        };
        let export = ExportConfig {
            data_dir: var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| ExportConfig::default().data_dir),
            delay_secs: if delay_secs == 0 { 1 } else { delay_secs },
        };

        let snapshot = if flag("GIT_REMOTE_ENABLED")? {
            let username = required("GIT_USER")?;
            SnapshotConfig {
                author_name: username.clone(),
                author_email: required("GIT_EMAIL")?,
                remote: Some(RemoteConfig {
                    url: required("GIT_URL")?,
                    branch: var("GIT_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
                    username,
                    token: required("GIT_TOKEN")?,
                }),
            }
        } else {
            SnapshotConfig {
                author_name: DEFAULT_AUTHOR_NAME.to_string(),
                author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
                remote: None,
            }
        };

        Ok(Self {
            exporter: ExporterConfig {
                providers,
                export,
                snapshot,
            },
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.exporter.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Accepts the spellings of Go's `strconv.ParseBool`
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExporterExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return ExporterExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExporterExitCode::ConfigError.into();
    }

    info!("dns-exporter v{}", env!("CARGO_PKG_VERSION"));

    let exporter = match build_exporter(&config.exporter) {
        Ok(exporter) => exporter,
        Err(e) => {
            error!("Failed to create providers: {}", e);
            return ExporterExitCode::ConfigError.into();
        }
    };

    // git operations are blocking and stay outside the runtime
    let snapshot = SnapshotManager::new(
        snapshot_repository(&config.exporter),
        config.exporter.snapshot.identity(),
    );
    if let Err(e) = snapshot.prepare() {
        error!("Failed to prepare snapshot repository: {}", e);
        return ExporterExitCode::RuntimeError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ExporterExitCode::RuntimeError.into();
        }
    };

    let phases_ok = rt.block_on(run_export(exporter));

    match snapshot.record(Utc::now()) {
        Ok(outcome) if outcome.committed() => info!("Snapshot recorded"),
        Ok(_) => {}
        Err(e) => {
            error!("Failed to record snapshot: {}", e);
            return ExporterExitCode::RuntimeError.into();
        }
    }

    if phases_ok {
        ExporterExitCode::Success.into()
    } else {
        ExporterExitCode::RuntimeError.into()
    }
}

/// Register built-in providers and create the enabled ones
fn build_exporter(config: &ExporterConfig) -> Result<Exporter> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "cloudflare")]
    dns_exporter_cloudflare::register(&registry);

    #[cfg(feature = "route53")]
    dns_exporter_route53::register(&registry);

    let mut exporter = Exporter::from_config(Arc::new(OsFilesystem::new()), &config.export);
    for provider_config in &config.providers {
        let provider: Arc<dyn DnsProvider> = registry
            .create_provider(provider_config)
            .with_context(|| format!("provider {}", provider_config.type_name()))?
            .into();
        info!("Enabled provider {}", provider.provider_name());
        exporter.add_provider(provider);
    }

    Ok(exporter)
}

fn snapshot_repository(config: &ExporterConfig) -> GitRepository {
    let repository = GitRepository::new(config.export.data_dir.clone());
    match &config.snapshot.remote {
        Some(remote) => repository.with_credentials(remote.username.clone(), remote.token.clone()),
        None => repository,
    }
}

/// Fetch then export; false if either phase reported a failure
///
/// A failed fetch does not skip the export: zones that were listed are
/// still written.
async fn run_export(mut exporter: Exporter) -> bool {
    let mut ok = true;

    if let Err(e) = exporter.fetch_all().await {
        error!("{}", e);
        ok = false;
    }
    for entry in exporter.providers() {
        info!("{}: {} zone(s)", entry.name(), entry.zones.len());
    }

    if let Err(e) = exporter.export_all().await {
        error!("{}", e);
        ok = false;
    }

    ok
}
