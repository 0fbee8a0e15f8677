//! Configuration settings for ezbackup
//!
//! Defines the CLI arguments, the persisted settings document, and the
//! resolved run configuration handed to the engine.

use crate::error::{BackupError, IoResultExt, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// ezbackup - concurrent, incremental backup tool
#[derive(Parser, Debug, Clone)]
#[command(name = "ezbackup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mirror files and directories into a backup location")]
#[command(long_about = r#"
ezbackup mirrors a chosen set of files and directories into a backup
location. Unchanged files are skipped, excluded paths and file types are
pruned, and directory trees are copied concurrently.

Examples:
  ezbackup ~/Documents ~/Pictures --dest /mnt/backup
  ezbackup ~/Projects --dest /mnt/backup --exclude ~/Projects/target
  ezbackup ~/Music --dest /mnt/backup --exclude-ext .part --threads 8
  ezbackup --settings backup.json
"#)]
pub struct CliArgs {
    /// Files and directories to back up
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<PathBuf>,

    /// Backup destination directory
    #[arg(short = 'd', long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Exact path to exclude (repeatable; directories are pruned whole)
    #[arg(long, value_name = "PATH")]
    pub exclude: Vec<PathBuf>,

    /// File name suffix to exclude (repeatable, e.g. ".tmp")
    #[arg(long = "exclude-ext", value_name = "SUFFIX")]
    pub exclude_ext: Vec<String>,

    /// Number of worker threads (0 = one per CPU)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM")]
    pub threads: usize,

    /// Record errors and keep going instead of stopping the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Load selections and exclusions from a settings file
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Save the effective selections and exclusions to a settings file
    #[arg(long, value_name = "PATH")]
    pub save_settings: Option<PathBuf>,

    /// Skip writing the backup log record at the destination
    #[arg(long)]
    pub no_log: bool,

    /// Show progress bars
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// What to do when a task reports an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Cancel the remainder of the run on the first error
    #[default]
    StopOnFirstError,
    /// Record errors and let the rest of the run proceed
    ContinueOnError,
}

/// Persisted backup settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSettings {
    /// Files and directories to back up
    #[serde(default)]
    pub included_paths: Vec<PathBuf>,
    /// Exact paths to exclude
    #[serde(default)]
    pub excluded_paths: Vec<PathBuf>,
    /// File name suffixes to exclude
    #[serde(default)]
    pub excluded_extensions: Vec<String>,
    /// Backup destination directory
    #[serde(default)]
    pub backup_root_directory: Option<PathBuf>,
}

impl BackupSettings {
    /// Load settings from a JSON file, sanitising the extension list
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).with_path(path)?;
        let mut settings: Self = serde_json::from_str(&contents)?;
        settings.excluded_extensions = sanitize_extensions(settings.excluded_extensions);
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).with_path(path)?;
        Ok(())
    }

    /// Overlay CLI arguments onto these settings
    pub fn merge_cli(&mut self, args: &CliArgs) {
        if !args.sources.is_empty() {
            self.included_paths = args.sources.clone();
        }
        if !args.exclude.is_empty() {
            self.excluded_paths = args.exclude.clone();
        }
        if !args.exclude_ext.is_empty() {
            self.excluded_extensions = sanitize_extensions(args.exclude_ext.clone());
        }
        if let Some(dest) = &args.dest {
            self.backup_root_directory = Some(dest.clone());
        }
    }
}

/// Drop suffix entries that cannot match a real file name: empty strings,
/// entries containing digits, and entries with no alphanumeric character
pub fn sanitize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .filter(|ext| {
            !ext.is_empty()
                && !ext.chars().any(|c| c.is_ascii_digit())
                && ext.chars().any(|c| c.is_alphanumeric())
        })
        .collect()
}

/// Resolved configuration for one backup run
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Files and directories to back up
    pub sources: Vec<PathBuf>,
    /// Backup destination directory
    pub destination: PathBuf,
    /// Exact paths to exclude
    pub excluded_paths: Vec<PathBuf>,
    /// File name suffixes to exclude
    pub excluded_extensions: Vec<String>,
    /// Worker threads (0 = one per CPU)
    pub threads: usize,
    /// Error handling policy
    pub policy: ErrorPolicy,
    /// Write the backup log record after a completed run
    pub write_log: bool,
}

impl BackupConfig {
    /// Build the run configuration from CLI arguments, loading and merging
    /// a settings file when one is given
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut settings = match &args.settings {
            Some(path) => BackupSettings::load(path)?,
            None => BackupSettings::default(),
        };
        settings.merge_cli(args);

        if let Some(path) = &args.save_settings {
            settings.save(path)?;
        }

        if settings.included_paths.is_empty() {
            return Err(BackupError::config("no sources to back up"));
        }
        let destination = settings
            .backup_root_directory
            .clone()
            .ok_or_else(|| BackupError::config("no backup destination given"))?;

        Ok(Self {
            sources: settings.included_paths,
            destination,
            excluded_paths: settings.excluded_paths,
            excluded_extensions: settings.excluded_extensions,
            threads: args.threads,
            policy: if args.continue_on_error {
                ErrorPolicy::ContinueOnError
            } else {
                ErrorPolicy::StopOnFirstError
            },
            write_log: !args.no_log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_extensions() {
        let input = vec![
            ".tmp".to_string(),
            String::new(),
            ".mp3".to_string(),
            "...".to_string(),
            "~bak".to_string(),
        ];
        let kept = sanitize_extensions(input);
        assert_eq!(kept, vec![".tmp".to_string(), "~bak".to_string()]);
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let settings = BackupSettings {
            included_paths: vec![PathBuf::from("/home/user/docs")],
            excluded_paths: vec![PathBuf::from("/home/user/docs/cache")],
            excluded_extensions: vec![".tmp".to_string()],
            backup_root_directory: Some(PathBuf::from("/mnt/backup")),
        };

        settings.save(&path).unwrap();
        let loaded = BackupSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_settings_json_keys() {
        let settings = BackupSettings {
            included_paths: vec![PathBuf::from("/a")],
            excluded_paths: vec![],
            excluded_extensions: vec![],
            backup_root_directory: Some(PathBuf::from("/b")),
        };

        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("included_paths").is_some());
        assert!(json.get("excluded_paths").is_some());
        assert!(json.get("excluded_extensions").is_some());
        assert!(json.get("backup_root_directory").is_some());
    }

    #[test]
    fn test_cli_overrides_settings_file() {
        let mut settings = BackupSettings {
            included_paths: vec![PathBuf::from("/from/file")],
            excluded_paths: vec![],
            excluded_extensions: vec![".old".to_string()],
            backup_root_directory: Some(PathBuf::from("/old/dest")),
        };

        let args = CliArgs::parse_from([
            "ezbackup",
            "/from/cli",
            "--dest",
            "/new/dest",
        ]);
        settings.merge_cli(&args);

        assert_eq!(settings.included_paths, vec![PathBuf::from("/from/cli")]);
        assert_eq!(
            settings.backup_root_directory,
            Some(PathBuf::from("/new/dest"))
        );
        // untouched when the CLI does not mention them
        assert_eq!(settings.excluded_extensions, vec![".old".to_string()]);
    }

    #[test]
    fn test_from_cli_requires_destination() {
        let args = CliArgs::parse_from(["ezbackup", "/some/source"]);
        assert!(BackupConfig::from_cli(&args).is_err());
    }
}
