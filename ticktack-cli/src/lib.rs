//! Command line front end for the ticker.
//!
//! ```text
//! echo "Doors open at eight" | ticktack set 4 --time 1478316000
//! ticktack del 4
//! ticktack list
//! ```

use anyhow::{Context, Result};
use bridge_traits::time::LogLevel;
use clap::{ArgAction, Args, Parser, Subcommand};
use core_runtime::config::{TickerConfig, DEFAULT_CONFIG_FILE};
use core_runtime::logging::init_logging;
use core_service::bootstrap_desktop;
use core_sync::Mutation;
use core_ticks::{TickId, TickInput};
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ticktack", version, about = "Publish a ticker of short messages to S3")]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Debug output (repeat for trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add or update a tick message. Message content is read from stdin.
    Set(SetArgs),

    /// Delete a tick message.
    Del {
        /// Tick id
        id: String,
    },

    /// List all ticker messages.
    List,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Tick id
    pub id: String,

    /// Timestamp for the tick (seconds since the epoch)
    #[arg(short = 't', long = "time", value_name = "EPOCH")]
    pub time: Option<i64>,

    /// Mark the tick as important
    #[arg(long)]
    pub important: bool,

    /// Local JPEG (or URL) to attach
    #[arg(long, value_name = "PATH")]
    pub media: Option<PathBuf>,
}

impl SetArgs {
    pub fn into_input(self, content: String) -> TickInput {
        let mut input = TickInput::new(self.id).content(content);
        if let Some(time) = self.time {
            input = input.time(time);
        }
        if self.important {
            input = input.important(true);
        }
        if let Some(media) = self.media {
            input = input.media_path(media.to_string_lossy());
        }
        input
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = TickerConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?
        .with_env_credentials();

    init_logging(logging_config(&config, cli.verbose)).context("failed to initialize logging")?;
    debug!(config = ?config, "Configuration loaded");

    let mut core = bootstrap_desktop(config).context("failed to initialize")?;

    match cli.command {
        Command::Set(args) => {
            let content = read_content(tokio::io::stdin()).await?;
            let summary = core.run(Mutation::Set(args.into_input(content))).await?;
            info!(outcome = ?summary.outcome, written = summary.written.len(), "Tick set");
        }
        Command::Del { id } => {
            let summary = core.run(Mutation::Delete(TickId::from(id))).await?;
            info!(written = summary.written.len(), "Tick deleted");
        }
        Command::List => {
            core.load().await?;
            println!("{}", core.dataset().to_json()?);
        }
    }

    Ok(())
}

fn logging_config(config: &TickerConfig, verbose: u8) -> core_runtime::logging::LoggingConfig {
    let logging = config.logging.to_logging_config();
    match verbose {
        0 => logging,
        1 => logging.with_level(LogLevel::Debug),
        _ => logging.with_level(LogLevel::Trace),
    }
}

/// Read the message body. One trailing line break is dropped.
async fn read_content<R: AsyncRead + Unpin>(mut reader: R) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .await
        .context("failed to read tick content from stdin")?;

    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "ticktack",
            "set",
            "4",
            "-t",
            "1478316000",
            "--important",
            "--media",
            "/tmp/cat.jpg",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("config.json"));
        let Command::Set(args) = cli.command else {
            panic!("expected set");
        };
        let input = args.into_input("hello".to_string());
        assert_eq!(input.id, json!("4"));
        assert_eq!(input.content, json!("hello"));
        assert_eq!(input.time, json!(1_478_316_000));
        assert_eq!(input.important, json!(true));
        assert_eq!(input.media, json!("/tmp/cat.jpg"));
    }

    #[test]
    fn test_set_without_options_leaves_defaults() {
        let cli = Cli::try_parse_from(["ticktack", "set", "9"]).unwrap();
        let Command::Set(args) = cli.command else {
            panic!("expected set");
        };
        let input = args.into_input(String::new());
        assert!(input.time.is_null());
        assert!(input.important.is_null());
        assert!(input.media.is_null());
    }

    #[test]
    fn test_parse_del_and_list_with_globals() {
        let cli = Cli::try_parse_from(["ticktack", "del", "4", "--config", "ticker.json", "-vv"])
            .unwrap();
        assert!(matches!(cli.command, Command::Del { ref id } if id == "4"));
        assert_eq!(cli.config, PathBuf::from("ticker.json"));
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["ticktack", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn test_argument_errors() {
        assert!(Cli::try_parse_from(["ticktack", "set"]).is_err());
        assert!(Cli::try_parse_from(["ticktack", "del", "1", "2"]).is_err());
        assert!(Cli::try_parse_from(["ticktack", "list", "extra"]).is_err());
        assert!(Cli::try_parse_from(["ticktack", "set", "1", "-t", "soon"]).is_err());
    }

    #[test]
    fn test_verbose_raises_level() {
        let config = TickerConfig::default();
        assert_eq!(logging_config(&config, 0).level, LogLevel::Info);
        assert_eq!(logging_config(&config, 1).level, LogLevel::Debug);
        assert_eq!(logging_config(&config, 3).level, LogLevel::Trace);
    }

    #[tokio::test]
    async fn test_read_content_drops_one_line_break() {
        assert_eq!(read_content(&b"hello\n"[..]).await.unwrap(), "hello");
        assert_eq!(read_content(&b"hello\r\n"[..]).await.unwrap(), "hello");
        assert_eq!(read_content(&b"two\nlines\n\n"[..]).await.unwrap(), "two\nlines\n");
        assert_eq!(read_content(&b""[..]).await.unwrap(), "");
    }
}
