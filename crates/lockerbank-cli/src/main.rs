//! `lockerctl`: drive a locker bank from the command line.
//!
//! Builds one link controller from the configuration, runs a single
//! operation and prints its result as JSON on stdout.
//!
//! Exit status: `0` on success, `1` when the operation failed, `2` when the
//! configuration could not be loaded.

mod logging;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lockerbank_hardware::{AccessGate, CommandResult, LinkConfig, LinkController};
use lockerbank_protocol::generate_frame;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

const EXIT_CONFIG_ERROR: u8 = 2;

/// Locker bank RS485 control tool
#[derive(Debug, Parser)]
#[command(name = "lockerctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML link configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serial device, overrides config file and LOCKERBANK_PORT
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Use the simulated transport
    #[arg(long, global = true)]
    simulate: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Link(LinkCommand),

    /// Print the hex frame for a board address and slot without sending it
    Frame {
        /// Board address (0-31)
        address: i64,

        /// Slot on the board (0-24)
        locker: i64,
    },
}

/// Operations that go through the link controller.
#[derive(Debug, Subcommand)]
enum LinkCommand {
    /// Release a locker
    Open {
        /// Logical locker id (1-based)
        id: i64,

        #[command(flatten)]
        location: Location,
    },

    /// Close a locker (same pulse as open)
    Close {
        /// Logical locker id (1-based)
        id: i64,

        #[command(flatten)]
        location: Location,
    },

    /// Query a locker's door state
    Status {
        /// Logical locker id (1-based)
        id: i64,
    },

    /// Probe the bus
    Test,

    /// Release a locker with a reservation access code
    Access {
        /// 8-digit access code
        code: String,

        /// Logical locker id (1-based)
        id: i64,

        #[command(flatten)]
        location: Location,
    },
}

/// Explicit wiring, overriding the computed location.
#[derive(Debug, Args)]
struct Location {
    /// Board address (0-31), requires --locker
    #[arg(long, requires = "locker", allow_negative_numbers = true)]
    address: Option<i64>,

    /// Slot on the board (0-24), requires --address
    #[arg(long, requires = "address", allow_negative_numbers = true)]
    locker: Option<i64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let config = match load_config(cli.config.as_deref(), cli.port.clone(), cli.simulate) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Configuration rejected");
            eprintln!("lockerctl: {:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    match cli.command {
        Command::Frame { address, locker } => print_frame(address, locker),
        Command::Link(command) => {
            let controller = Arc::new(LinkController::connect(config).await);
            let result = execute(controller, command).await;
            print_result(&result)
        }
    }
}

/// Layer the configuration: defaults, then file, then environment, then flags.
fn load_config(file: Option<&Path>, port: Option<String>, simulate: bool) -> Result<LinkConfig> {
    let mut config = match file {
        Some(path) => LinkConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LinkConfig::default(),
    };

    config.apply_env_overrides();

    if let Some(port) = port {
        config.port = port;
    }
    if simulate {
        config.simulate = true;
    }

    config.validate().context("invalid link configuration")?;
    Ok(config)
}

async fn execute(controller: Arc<LinkController>, command: LinkCommand) -> CommandResult {
    match command {
        LinkCommand::Open { id, location } => {
            controller
                .open_locker(id, location.address, location.locker)
                .await
        }
        LinkCommand::Close { id, location } => {
            controller
                .close_locker(id, location.address, location.locker)
                .await
        }
        LinkCommand::Status { id } => controller.get_status(id).await,
        LinkCommand::Test => controller.test_connection().await,
        LinkCommand::Access { code, id, location } => {
            AccessGate::new(controller)
                .access_with_code(&code, id, location.address, location.locker)
                .await
        }
    }
}

fn print_result(result: &CommandResult) -> ExitCode {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("lockerctl: cannot render result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_frame(address: i64, locker: i64) -> ExitCode {
    match generate_frame(address, locker) {
        Ok(frame) => {
            println!("{}", frame);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("lockerctl: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_open_with_location() {
        let cli = Cli::try_parse_from([
            "lockerctl", "--simulate", "open", "12", "--address", "3", "--locker", "4",
        ])
        .unwrap();

        assert!(cli.simulate);
        match cli.command {
            Command::Link(LinkCommand::Open { id, location }) => {
                assert_eq!(id, 12);
                assert_eq!(location.address, Some(3));
                assert_eq!(location.locker, Some(4));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_half_location_is_rejected() {
        assert!(Cli::try_parse_from(["lockerctl", "open", "1", "--address", "3"]).is_err());
    }

    #[test]
    fn test_parse_access_and_frame() {
        let cli = Cli::try_parse_from(["lockerctl", "access", "00012345", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Link(LinkCommand::Access { ref code, id: 7, .. }) if code == "00012345"
        ));

        let cli = Cli::try_parse_from(["lockerctl", "frame", "31", "24"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Frame {
                address: 31,
                locker: 24
            }
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lockerctl", "test", "--port", "/dev/ttyS1", "--json-logs"])
                .unwrap();
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyS1"));
        assert!(cli.json_logs);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"/dev/ttyUSB3\"\nbaud_rate = 19200").unwrap();

        let config = load_config(Some(file.path()), Some("/dev/ttyS9".into()), true).unwrap();

        assert_eq!(config.port, "/dev/ttyS9");
        assert_eq!(config.baud_rate, 19200);
        assert!(config.simulate);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud_rate = 0").unwrap();

        let err = load_config(Some(file.path()), None, false).unwrap_err();
        assert!(format!("{:#}", err).contains("baud_rate"));
    }

    #[test]
    fn test_empty_port_flag_is_rejected() {
        assert!(load_config(None, Some(String::new()), false).is_err());
    }
}
