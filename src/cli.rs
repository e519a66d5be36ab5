// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::generator::GeneratorMode;

/// Command-line arguments for `samlocal`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "samlocal",
    version,
    about = "Run Lambda functions locally through the AWS SAM CLI.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the function map (TOML).
    ///
    /// Default: `Samlocal.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Samlocal.toml")]
    pub config: String,

    /// Emulation mode. Overrides `[config].mode` from the file.
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<CliMode>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SAMLOCAL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Unpack functions and print the generated template, but don't start SAM.
    #[arg(long)]
    pub dry_run: bool,
}

/// Emulation mode as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CliMode {
    /// `sam local start-api`
    Api,
    /// `sam local start-lambda`
    Sdk,
}

impl From<CliMode> for GeneratorMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Api => GeneratorMode::Api,
            CliMode::Sdk => GeneratorMode::Sdk,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let args = CliArgs::try_parse_from(["samlocal"]).unwrap();
        assert_eq!(args.config, "Samlocal.toml");
        assert!(args.mode.is_none());
        assert!(!args.dry_run);

        let args = CliArgs::try_parse_from([
            "samlocal", "--config", "fixtures/sam.toml", "--mode", "sdk", "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.config, "fixtures/sam.toml");
        assert_eq!(args.mode.map(GeneratorMode::from), Some(GeneratorMode::Sdk));
        assert!(args.dry_run);
    }
}
