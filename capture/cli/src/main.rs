//! coursecap command line interface.

mod profiles_cmd;
mod replay_cmd;
mod script;
mod watch_cmd;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use coursecap_config::{
    apply_defaults, config_dir, config_file_path, load_config, write_config, CoursecapConfig,
    LoggingConfig,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursecap")]
#[command(about = "Capture lecture subtitles and screenshots into a local collector")]
#[command(version)]
struct Cli {
    /// Config file path. Defaults to `config.yaml` in the coursecap
    /// config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Tracing filter, e.g. `debug` or `coursecap_session=trace`.
    #[arg(long, global = true)]
    log: Option<String>,
    /// Emit JSON log lines instead of the human format.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch a notes directory and drive the editor as files land.
    Watch {
        /// Notes root. Overrides `notes.root` from the config.
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Drive a capture session from a scripted page.
    Replay {
        /// YAML script describing the page and its event sequence.
        script: PathBuf,
        /// Record payloads instead of sending them to the collector.
        #[arg(long)]
        dry_run: bool,
    },
    /// List the configured site profiles.
    Profiles {
        /// Also validate the config and fail on errors.
        #[arg(long)]
        validate: bool,
    },
    /// Write a starter config file with the builtin profiles.
    Init {
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    match cli.command {
        // Init must work even when the existing file fails to parse.
        Commands::Init { force } => {
            init_logging(None, cli.log.as_deref(), cli.log_json);
            init_config(&config_path, force).await
        }
        Commands::Watch { root } => {
            let config = load_and_log(&config_path, cli.log.as_deref(), cli.log_json).await?;
            watch_cmd::run(&config, root).await
        }
        Commands::Replay { script, dry_run } => {
            let config = load_and_log(&config_path, cli.log.as_deref(), cli.log_json).await?;
            replay_cmd::run(&config, &script, dry_run).await
        }
        Commands::Profiles { validate } => {
            let config = load_and_log(&config_path, cli.log.as_deref(), cli.log_json).await?;
            profiles_cmd::run(&config, validate)
        }
    }
}

async fn load_and_log(path: &Path, log: Option<&str>, json: bool) -> Result<CoursecapConfig> {
    let config = load_config(path).await?;
    init_logging(config.logging.as_ref(), log, json);
    Ok(config)
}

async fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "`{}` already exists; pass --force to overwrite",
            path.display()
        );
    }
    let mut config = CoursecapConfig::default();
    apply_defaults(&mut config);
    write_config(&config, path).await?;
    println!("wrote starter config to {}", path.display());
    Ok(())
}

fn init_logging(config: Option<&LoggingConfig>, log_override: Option<&str>, json_flag: bool) {
    let level = log_override
        .map(str::to_string)
        .or_else(|| config.and_then(|logging| logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = json_flag || config.map(|logging| logging.json).unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use uuid::Uuid;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn replay_args_parse() {
        let cli = Cli::parse_from(["coursecap", "replay", "run.yaml", "--dry-run"]);
        match cli.command {
            Commands::Replay { script, dry_run } => {
                assert_eq!(script, PathBuf::from("run.yaml"));
                assert!(dry_run);
            }
            _ => panic!("expected the replay command"),
        }
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::parse_from(["coursecap", "profiles", "--config", "/tmp/c.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
    }

    #[tokio::test]
    async fn init_refuses_to_clobber_without_force() {
        let dir = std::env::temp_dir().join(format!("coursecap-init-{}", Uuid::new_v4()));
        let path = dir.join("config.yaml");

        init_config(&path, false).await.unwrap();
        assert!(path.exists());

        let err = init_config(&path, false).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        init_config(&path, true).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
