//! CLI argument parsing using clap.

use anyhow::{anyhow, bail};
use clap::{
    ArgAction, Parser,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::config::Settings;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Report changes under directory trees, one line per change
#[derive(Parser, Debug)]
#[command(
    name = "zatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Report changes under directory trees, one line per change",
    long_about = "Watches each DIR recursively and prints a line on stdout for every \
                  change. Lines name the directory as it was typed on the command line; \
                  with --subdir the changed sub-path is appended.",
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Directories to watch
    #[arg(value_name = "DIR", required = true)]
    pub dirs: Vec<PathBuf>,

    /// Print every watched directory before watching starts
    #[arg(short, long)]
    pub preflight: bool,

    /// Append the changed sub-path to each line
    #[arg(short = 's', long = "subdir")]
    pub sub_directories: bool,

    /// More diagnostics on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Fewer diagnostics on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Path to custom settings.toml file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Coalescing latency hint in milliseconds
    #[arg(long, value_name = "MS")]
    pub latency: Option<u64>,
}

impl Cli {
    /// Net verbosity: positive for `-v`, negative for `-q`.
    pub fn verbosity(&self) -> i32 {
        i32::from(self.verbose) - i32::from(self.quiet)
    }

    /// Apply command line overrides on top of loaded settings.
    ///
    /// Flags only ever switch features on; they cannot disable what the
    /// configuration file enables.
    pub fn apply(&self, settings: &mut Settings) {
        settings.preflight |= self.preflight;
        settings.sub_directories |= self.sub_directories;
        if let Some(latency) = self.latency {
            settings.latency_ms = latency;
        }
        settings.logging.default =
            crate::logging::shift_level(&settings.logging.default, self.verbosity());
    }

    /// Load layered settings and apply this command line on top.
    pub fn load_settings(&self) -> anyhow::Result<Settings> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
        }

        let mut settings = Settings::load(self.config.as_deref())
            .map_err(|e| anyhow!("invalid configuration: {e}"))?;
        self.apply(&mut settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags_and_dirs() {
        let cli = Cli::try_parse_from(["zatch", "-p", "-s", "-vv", "src", "docs/"]).unwrap();
        assert!(cli.preflight);
        assert!(cli.sub_directories);
        assert_eq!(cli.verbosity(), 2);
        assert_eq!(
            cli.dirs,
            vec![PathBuf::from("src"), PathBuf::from("docs/")]
        );
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["zatch"]).is_err());
        assert!(Cli::try_parse_from(["zatch", "-p"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_net_out() {
        let cli = Cli::try_parse_from(["zatch", "-v", "-q", "."]).unwrap();
        assert_eq!(cli.verbosity(), 0);

        let cli = Cli::try_parse_from(["zatch", "-vvv", "-q", "."]).unwrap();
        assert_eq!(cli.verbosity(), 2);

        let cli = Cli::try_parse_from(["zatch", "-qq", "."]).unwrap();
        assert_eq!(cli.verbosity(), -2);

        let mut settings = Settings::default();
        Cli::try_parse_from(["zatch", "-q", "-vv", "."])
            .unwrap()
            .apply(&mut settings);
        assert_eq!(settings.logging.default, "info");
    }

    #[test]
    fn test_apply_overrides_settings() {
        let cli = Cli::try_parse_from(["zatch", "-s", "-v", "--latency", "200", "."]).unwrap();
        let mut settings = Settings {
            preflight: true,
            ..Settings::default()
        };
        cli.apply(&mut settings);

        assert!(settings.preflight);
        assert!(settings.sub_directories);
        assert_eq!(settings.latency_ms, 200);
        assert_eq!(settings.logging.default, "info");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent.toml");
        let cli = Cli::try_parse_from([
            OsStr::new("zatch"),
            OsStr::new("-c"),
            missing.as_os_str(),
            OsStr::new("."),
        ])
        .unwrap();

        let err = cli.load_settings().unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(&path, "sub_directories = true\n").unwrap();

        let cli = Cli::try_parse_from([
            OsStr::new("zatch"),
            OsStr::new("--config"),
            path.as_os_str(),
            OsStr::new("."),
        ])
        .unwrap();

        let settings = cli.load_settings().unwrap();
        assert!(settings.sub_directories);
        assert!(!settings.preflight);
    }
}
