use std::fmt;
use std::path::{Path, PathBuf};

use lab_core::model::{AppSettingsDraft, LabId};

pub const DEFAULT_DB_URL: &str = "sqlite://promptlab.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidLabId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidLabId { raw } => write!(f, "invalid lab id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Course,
    Lab(Option<LabId>),
    Results,
    Reset,
    Settings(Option<SettingsUpdate>),
    TestApi,
    Help,
}

/// Settings flags given on the command line; unset flags keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub base_url: Option<String>,
}

impl SettingsUpdate {
    #[must_use]
    pub fn apply(self, mut draft: AppSettingsDraft) -> AppSettingsDraft {
        if self.api_key.is_some() {
            draft.api_key = self.api_key;
        }
        if self.text_model.is_some() {
            draft.text_model = self.text_model;
        }
        if self.image_model.is_some() {
            draft.image_model = self.image_model;
        }
        if self.base_url.is_some() {
            draft.base_url = self.base_url;
        }
        draft
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub assets_dir: PathBuf,
}

impl Args {
    /// Parse process arguments (without the program name), with
    /// `PROMPTLAB_DB_URL` and `PROMPTLAB_ASSETS_DIR` as fallbacks.
    pub fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(argv, |name| std::env::var(name).ok())
    }

    fn parse_with_env(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("PROMPTLAB_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut assets_dir = env("PROMPTLAB_ASSETS_DIR")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        let mut command_name: Option<String> = None;
        let mut lab_arg: Option<String> = None;
        let mut update = SettingsUpdate::default();
        let mut has_update = false;

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--assets" => assets_dir = PathBuf::from(require_value(&mut args, "--assets")?),
                "--api-key" => {
                    update.api_key = Some(require_value(&mut args, "--api-key")?);
                    has_update = true;
                }
                "--text-model" => {
                    update.text_model = Some(require_value(&mut args, "--text-model")?);
                    has_update = true;
                }
                "--image-model" => {
                    update.image_model = Some(require_value(&mut args, "--image-model")?);
                    has_update = true;
                }
                "--base-url" => {
                    update.base_url = Some(require_value(&mut args, "--base-url")?);
                    has_update = true;
                }
                "--help" | "-h" => command_name = Some("help".into()),
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if command_name.is_none() => command_name = Some(arg),
                _ if command_name.as_deref() == Some("lab") && lab_arg.is_none() => {
                    lab_arg = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match command_name.as_deref().unwrap_or("course") {
            "course" => Command::Course,
            "lab" => Command::Lab(
                lab_arg
                    .map(|raw| {
                        raw.parse::<LabId>()
                            .map_err(|_| ArgsError::InvalidLabId { raw })
                    })
                    .transpose()?,
            ),
            "results" => Command::Results,
            "reset" => Command::Reset,
            "settings" => Command::Settings(has_update.then_some(update)),
            "test-api" => Command::TestApi,
            "help" => Command::Help,
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };
        if has_update && !matches!(command, Command::Settings(_)) {
            return Err(ArgsError::UnknownArg(
                "settings flags are only accepted by `settings`".into(),
            ));
        }

        Ok(Self {
            command,
            db_url,
            assets_dir,
        })
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  promptlab [course]                 list tracks and progress");
    eprintln!("  promptlab lab [<id>]               run a lab (default: first unfinished)");
    eprintln!("  promptlab results                  course summary and diagnostic");
    eprintln!("  promptlab reset                    clear all progress");
    eprintln!("  promptlab settings [--api-key K] [--text-model M] [--image-model M] [--base-url U]");
    eprintln!("  promptlab test-api                 verify the Gemini API key");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>   default {DEFAULT_DB_URL}");
    eprintln!("  --assets <dir>      lab images and documents, default .");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROMPTLAB_DB_URL, PROMPTLAB_ASSETS_DIR, PROMPTLAB_LOG");
    eprintln!("  PROMPTLAB_GEMINI_API_KEY, PROMPTLAB_GEMINI_BASE_URL,");
    eprintln!("  PROMPTLAB_GEMINI_TEXT_MODEL, PROMPTLAB_GEMINI_IMAGE_MODEL");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory if missing.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
