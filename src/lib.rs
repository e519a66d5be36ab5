// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod exec;
pub mod generator;
pub mod logging;
pub mod proxy;
pub mod template;
pub mod workspace;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::events::Topic;
use crate::generator::{GenerateOptions, GeneratorMode, SamGenerator};

/// High-level entry point used by `main.rs`.
///
/// Loads the function map, unpacks and assembles everything, then either
/// prints the template (`--dry-run`) or runs `sam local` until Ctrl-C or
/// until the process exits on its own.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mode = args.mode.map(GeneratorMode::from).unwrap_or(cfg.config.mode);
    let options = GenerateOptions {
        cwd: Some(resolve_cwd(&config_path, &cfg)),
        randomize_function_names: cfg.config.randomize_function_names,
    };

    let mut generator = SamGenerator::new(mode)?.with_sam_binary(cfg.config.sam_binary.clone());
    if let Err(e) = generator.generate_functions(&cfg.function, &options) {
        generator.stop().await?;
        return Err(e.into());
    }

    if args.dry_run {
        print!("{}", generator.template().to_yaml()?);
        generator.stop().await?;
        return Ok(());
    }

    generator.on(Topic::Data, |chunk| {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(chunk);
        let _ = out.flush();
    });
    generator.on(Topic::Error, |chunk| {
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(chunk);
        let _ = err.flush();
    });

    let instance = match generator.start(cfg.cli.clone()).await {
        Ok(instance) => instance,
        Err(e) => {
            if let Err(stop_err) = generator.stop().await {
                warn!(error = %stop_err, "cleanup after failed start also failed");
            }
            return Err(e.into());
        }
    };

    info!(%mode, endpoint = %instance.endpoint, "samlocal running; press Ctrl-C to stop");
    for (external, internal) in generator.names().iter() {
        info!(function = %external, internal = %internal, "function available");
    }

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("Ctrl-C received; stopping");
        }
        status = generator.wait_for_exit() => {
            warn!(?status, "sam local exited on its own");
        }
    }

    generator.stop().await?;
    Ok(())
}

/// `[config].cwd` relative to the config file; the config file's directory
/// when unset.
fn resolve_cwd(config_path: &Path, cfg: &ConfigFile) -> PathBuf {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match &cfg.config.cwd {
        Some(cwd) if cwd.is_absolute() => cwd.clone(),
        Some(cwd) => config_dir.join(cwd),
        None => config_dir.to_path_buf(),
    }
}
