use clap::{Args, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use linkframe_frame::MAX_PAYLOAD;
use linkframe_link::LinkConfig;
use linkframe_marshal::{ScalarFormat, ValueType};

use crate::exit::{io_error, link_error, CliError, CliResult, DATA_INVALID, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod send;
pub mod table;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame a payload and write the wire bytes to stdout.
    Encode(EncodeArgs),
    /// Parse a captured byte stream and print its frames.
    Decode(DecodeArgs),
    /// Print the checksum lookup table.
    Table(TableArgs),
    /// Listen on a serial port and print received packets.
    Listen(ListenArgs),
    /// Send a single packet over a serial port.
    Send(SendArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: LinkConfig) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, &config),
        Command::Decode(args) => decode::run(args, format, config),
        Command::Table(args) => table::run(args, format, &config),
        Command::Listen(args) => listen::run(args, format, config),
        Command::Send(args) => send::run(args, config),
        Command::Version(args) => version::run(args),
    }
}

/// Load link configuration from a JSON file, or the defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<LinkConfig> {
    let Some(path) = path else {
        return Ok(LinkConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    LinkConfig::from_json(&text).map_err(|err| link_error(&path.display().to_string(), err))
}

/// Payload sources; exactly one is required.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// UTF-8 text payload.
    #[arg(long)]
    pub data: Option<String>,
    /// Hex payload, e.g. "01 02 7e" or "01027e".
    #[arg(long)]
    pub hex: Option<String>,
    /// JSON payload (validated, sent compact).
    #[arg(long)]
    pub json: Option<String>,
    /// Read payload bytes from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl PayloadArgs {
    pub fn resolve(&self) -> CliResult<Vec<u8>> {
        let payload = if let Some(data) = &self.data {
            data.as_bytes().to_vec()
        } else if let Some(hex) = &self.hex {
            parse_hex(hex)?
        } else if let Some(json) = &self.json {
            let value: serde_json::Value = serde_json::from_str(json)
                .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
            serde_json::to_vec(&value)
                .map_err(|err| CliError::new(DATA_INVALID, format!("--json: {err}")))?
        } else if let Some(path) = &self.file {
            fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
        } else {
            return Err(CliError::new(USAGE, "no payload given"));
        };

        if payload.len() > MAX_PAYLOAD {
            return Err(CliError::new(
                DATA_INVALID,
                format!(
                    "payload is {} bytes, maximum is {MAX_PAYLOAD}",
                    payload.len()
                ),
            ));
        }
        Ok(payload)
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum WireOutput {
    /// Space-separated upper-case hex.
    #[default]
    Hex,
    /// Raw bytes.
    Raw,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet id.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub id: u8,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// How to write the frame.
    #[arg(long, value_enum, default_value_t = WireOutput::Hex)]
    pub output: WireOutput,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read the stream from a file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Treat the input as hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Decode each payload as this type (text, json, float, bool, int, char,
    /// list, or a format code such as H).
    #[arg(long = "as", value_name = "TYPE", value_parser = parse_value_type)]
    pub value_type: Option<ValueType>,
    /// Element format code for list payloads.
    #[arg(long, value_name = "CODE", value_parser = parse_format_code)]
    pub list_format: Option<ScalarFormat>,
}

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Checksum polynomial (decimal or 0x-prefixed hex). Default: from config.
    #[arg(long, value_parser = parse_u8)]
    pub polynomial: Option<u8>,
    /// Table width in bits. Default: from config.
    #[arg(long)]
    pub width: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Serial port name, e.g. /dev/ttyUSB0 or COM3.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value = "115200")]
    pub baud: u32,
    /// Exit after receiving N packets.
    #[arg(long)]
    pub count: Option<usize>,
    /// Only print these packet ids (comma-separated).
    #[arg(long, value_delimiter = ',', value_parser = parse_u8)]
    pub ids: Option<Vec<u8>>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port name, e.g. /dev/ttyUSB0 or COM3.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value = "115200")]
    pub baud: u32,
    /// Packet id.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub id: u8,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a byte given in decimal or with a `0x` prefix.
pub fn parse_u8(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("'{input}' is not a byte (0..=255 or 0x00..=0xFF)"))
}

fn parse_value_type(input: &str) -> Result<ValueType, String> {
    input.parse::<ValueType>().map_err(|err| err.to_string())
}

fn parse_format_code(input: &str) -> Result<ScalarFormat, String> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(code), None) => ScalarFormat::from_code(code).map_err(|err| err.to_string()),
        _ => Err(format!("'{input}' is not a single format code")),
    }
}

/// Parse hex bytes, ignoring whitespace and an optional `0x` per byte group.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .split_whitespace()
        .map(|group| {
            group
                .strip_prefix("0x")
                .or_else(|| group.strip_prefix("0X"))
                .unwrap_or(group)
        })
        .flat_map(str::bytes)
        .collect();

    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "hex input has an odd number of digits",
        ));
    }

    digits
        .chunks_exact(2)
        .map(|pair| -> CliResult<u8> { Ok((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?) })
        .collect()
}

fn hex_digit(b: u8) -> CliResult<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        _ => Err(CliError::new(
            USAGE,
            format!("invalid hex digit '{}'", char::from(b)),
        )),
    }
}
