//! Predictor configuration: artifact paths and tuning constants.
//!
//! Every knob resolves with the same priority: explicit caller value >
//! environment variable > `sentra.toml` > built-in default. Lexical
//! artifact paths additionally fall back to discovery under the default
//! models directory, and stay unset when no file is present there.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

/// Default inference batch size.
pub const DEFAULT_BATCH_SIZE: usize = 16;
/// Default maximum token length per passage.
pub const DEFAULT_MAX_LENGTH: usize = 128;

pub const MODEL_DIR_ENV: &str = "SENTRA_MODEL_DIR";
pub const CLASSIFIER_ENV: &str = "SENTRA_CLASSIFIER_PATH";
pub const VECTORIZER_ENV: &str = "SENTRA_VECTORIZER_PATH";
pub const BATCH_SIZE_ENV: &str = "SENTRA_BATCH_SIZE";
pub const MAX_LENGTH_ENV: &str = "SENTRA_MAX_LENGTH";
pub const DEVICE_ENV: &str = "SENTRA_DEVICE";

const CONFIG_FILE: &str = "sentra.toml";
const MODEL_DIR_NAME: &str = "finbert";
const CLASSIFIER_FILE: &str = "classifier.json";
const VECTORIZER_FILE: &str = "vectorizer.json";

/// Compute device preference, resolved once at predictor construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use an accelerator when a supported one is available, else CPU.
    #[default]
    Auto,
    /// Force CPU execution.
    Cpu,
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            other => Err(format!("Unknown device '{}'. Supported: auto, cpu", other)),
        }
    }
}

/// Tuning overrides read from `sentra.toml`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigFile {
    pub batch_size: Option<usize>,
    pub max_length: Option<usize>,
    pub device: Option<DevicePreference>,
}

/// Unresolved overrides supplied by the caller (CLI flags or an embedding
/// host constructing the predictor programmatically).
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub model_dir: Option<PathBuf>,
    pub classifier_path: Option<PathBuf>,
    pub vectorizer_path: Option<PathBuf>,
    pub batch_size: Option<usize>,
    pub max_length: Option<usize>,
    pub device: Option<DevicePreference>,
}

impl ConfigOverrides {
    /// Overrides taken from `SENTRA_*` environment variables.
    fn from_env() -> Self {
        Self {
            model_dir: env_path(MODEL_DIR_ENV),
            classifier_path: env_path(CLASSIFIER_ENV),
            vectorizer_path: env_path(VECTORIZER_ENV),
            batch_size: env_parsed(BATCH_SIZE_ENV),
            max_length: env_parsed(MAX_LENGTH_ENV),
            device: env_parsed(DEVICE_ENV),
        }
    }
}

/// Fully resolved predictor configuration.
///
/// `classifier_path`/`vectorizer_path` are `None` when the lexical path is
/// not configured at all; a configured path that later fails to load still
/// only degrades the predictor, it does not fail construction.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub model_dir: PathBuf,
    pub classifier_path: Option<PathBuf>,
    pub vectorizer_path: Option<PathBuf>,
    pub batch_size: usize,
    pub max_length: usize,
    pub device: DevicePreference,
}

impl PredictorConfig {
    /// Resolve configuration from overrides, environment, config file and
    /// default artifact discovery.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        let env = ConfigOverrides::from_env();
        let file = load_config_file(Path::new(CONFIG_FILE));
        Self::resolve_with(overrides, env, file, &default_artifact_dir())
    }

    fn resolve_with(
        explicit: ConfigOverrides,
        env: ConfigOverrides,
        file: ConfigFile,
        base: &Path,
    ) -> Self {
        Self {
            model_dir: explicit
                .model_dir
                .or(env.model_dir)
                .unwrap_or_else(|| base.join(MODEL_DIR_NAME)),
            classifier_path: explicit
                .classifier_path
                .or(env.classifier_path)
                .or_else(|| existing(base.join(CLASSIFIER_FILE))),
            vectorizer_path: explicit
                .vectorizer_path
                .or(env.vectorizer_path)
                .or_else(|| existing(base.join(VECTORIZER_FILE))),
            batch_size: explicit
                .batch_size
                .or(env.batch_size)
                .or(file.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
            max_length: explicit
                .max_length
                .or(env.max_length)
                .or(file.max_length)
                .unwrap_or(DEFAULT_MAX_LENGTH),
            device: explicit
                .device
                .or(env.device)
                .or(file.device)
                .unwrap_or_default(),
        }
    }
}

/// Load tuning overrides from a `sentra.toml` if present.
///
/// An unreadable or unparsable file is reported and ignored rather than
/// failing resolution.
fn load_config_file(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                ConfigFile::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            ConfigFile::default()
        }
    }
}

/// Default artifact base directory: `./models` if present, else
/// `~/.sentra/models`.
fn default_artifact_dir() -> PathBuf {
    let local = Path::new("models");
    if local.is_dir() {
        return local.to_path_buf();
    }
    dirs::home_dir()
        .map(|h| h.join(".sentra").join("models"))
        .unwrap_or_else(|| PathBuf::from(".sentra/models"))
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let value = std::env::var(name).ok()?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Failed to parse {}='{}': {}. Ignoring.", name, value, e);
            None
        }
    }
}
