//! Proctor batch runner
//!
//! Loads layered settings, reads recorded measurement files, and runs each
//! session on the blocking pool.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use measurement::Measurement;
use serde::{Deserialize, Serialize};
use session::{SessionConfig, SessionOrchestrator, SessionReport};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Environment variable prefix for setting overrides, e.g.
/// `PROCTOR__SESSION__SCORING__SATURATION=8`
pub const ENV_PREFIX: &str = "PROCTOR";

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Built-in starting points for the session settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Balanced,
    Strict,
    Lenient,
}

impl Preset {
    pub fn session_config(self) -> SessionConfig {
        match self {
            Preset::Balanced => SessionConfig::default(),
            Preset::Strict => SessionConfig::strict(),
            Preset::Lenient => SessionConfig::lenient(),
        }
    }
}

/// Effective settings of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProctorSettings {
    pub session: SessionConfig,
    pub logging: LoggingSettings,
}

impl ProctorSettings {
    /// Layer preset, optional settings file, then `PROCTOR__*` environment
    pub fn load(preset: Preset, file: Option<&Path>) -> Result<Self> {
        let base = ProctorSettings {
            session: preset.session_config(),
            ..Default::default()
        };

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&base).context("Failed to encode preset settings")?);
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> Result<()> {
    let level = Level::from_str(&settings.level)
        .map_err(|_| anyhow::anyhow!("Unknown log level: {}", settings.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

/// A recorded session on disk: either an object with an optional id, or a
/// bare array of measurements
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SessionInput {
    Recording {
        #[serde(default)]
        session_id: Option<String>,
        measurements: Vec<Measurement>,
    },
    Bare(Vec<Measurement>),
}

impl SessionInput {
    pub fn into_parts(self) -> (Option<String>, Vec<Measurement>) {
        match self {
            SessionInput::Recording {
                session_id,
                measurements,
            } => (session_id, measurements),
            SessionInput::Bare(measurements) => (None, measurements),
        }
    }
}

/// Read a session file
pub fn load_input(path: &Path) -> Result<SessionInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed session file {}", path.display()))
}

/// Result of analysing one file
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SessionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Analyse one file; failures are captured in the output
pub fn analyze_file(orchestrator: &SessionOrchestrator, path: &Path) -> AnalysisOutput {
    let source = path.display().to_string();
    let outcome = load_input(path).and_then(|input| {
        let (session_id, frames) = input.into_parts();
        orchestrator
            .run(session_id, frames)
            .with_context(|| format!("Session in {} failed", source))
    });

    let (report, error) = match outcome {
        Ok(report) => {
            info!("{}: {:?} ({:.3})", source, report.risk_classification, report.confidence_score);
            (Some(report), None)
        }
        Err(e) => {
            error!("{:#}", e);
            (None, Some(format!("{:#}", e)))
        }
    };

    AnalysisOutput {
        source,
        generated_at: Utc::now(),
        report,
        error,
    }
}

/// Analyse files concurrently, one blocking task per session
pub async fn analyze_files(
    orchestrator: Arc<SessionOrchestrator>,
    paths: Vec<PathBuf>,
) -> Result<Vec<AnalysisOutput>> {
    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::task::spawn_blocking(move || analyze_file(&orchestrator, &path))
        })
        .collect();

    let mut outputs = Vec::with_capacity(tasks.len());
    for task in tasks {
        outputs.push(task.await.context("Analysis task failed")?);
    }

    info!(
        "Analysed {} sessions, {} failed",
        outputs.len(),
        outputs.iter().filter(|o| !o.is_ok()).count()
    );
    Ok(outputs)
}
