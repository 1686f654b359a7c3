mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "linkframe", version, about = "Serial packet framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    /// Link configuration file (JSON).
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::load_config(cli.config.as_deref())
        .and_then(|config| cmd::run(cli.command, format, config));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "linkframe",
            "send",
            "/dev/ttyUSB0",
            "--id",
            "0x10",
            "--data",
            "hello",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.id, 0x10);
                assert_eq!(args.baud, 115_200);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "linkframe",
            "encode",
            "--hex",
            "0102",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn encode_requires_a_payload() {
        let err = Cli::try_parse_from(["linkframe", "encode"]).expect_err("payload is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_decode_value_type() {
        let cli = Cli::try_parse_from([
            "linkframe",
            "decode",
            "--hex",
            "--as",
            "list",
            "--list-format",
            "H",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert!(args.hex);
                assert_eq!(args.value_type, Some(linkframe_marshal::ValueType::List));
                assert_eq!(args.list_format, Some(linkframe_marshal::ScalarFormat::U16));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["linkframe", "table", "--config", "link.json"])
            .expect("global flag should parse");
        assert_eq!(cli.config, Some(PathBuf::from("link.json")));
    }

    #[test]
    fn listen_ids_are_comma_separated() {
        let cli = Cli::try_parse_from(["linkframe", "listen", "COM3", "--ids", "1,0x02,255"])
            .expect("listen args should parse");
        match cli.command {
            Command::Listen(args) => assert_eq!(args.ids, Some(vec![1, 2, 255])),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
