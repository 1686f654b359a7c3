use std::fmt::Write as _;
use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use linkframe_frame::{ChecksumTable, Status};
use linkframe_link::Received;
use linkframe_marshal::Value;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    event: &'static str,
    id: u8,
    payload_size: usize,
    payload_hex: String,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_type: Option<&'a str>,
    timestamp: String,
}

#[derive(Serialize)]
struct StatusOutput {
    event: &'static str,
    status: &'static str,
    code: i8,
    timestamp: String,
}

#[derive(Serialize)]
struct TableOutput<'a> {
    polynomial: u8,
    width_bits: u32,
    entries: &'a [u8],
}

pub fn print_frame(packet: &Received<'_>, value: Option<&Value>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                event: "frame",
                id: packet.id(),
                payload_size: packet.len(),
                payload_hex: hex_string(packet.payload()),
                payload: payload_preview(packet.payload()),
                value: value.map(ToString::to_string),
                value_type: value.map(Value::kind),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "SIZE", "PAYLOAD", "VALUE"])
                .add_row(vec![
                    packet.id().to_string(),
                    packet.len().to_string(),
                    hex_string(packet.payload()),
                    value.map_or_else(|| payload_preview(packet.payload()), ToString::to_string),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!(
                "id={} size={} payload={}",
                packet.id(),
                packet.len(),
                hex_string(packet.payload())
            );
            if let Some(value) = value {
                let _ = write!(line, " value={value}");
            }
            println!("{line}");
        }
        OutputFormat::Raw => {
            print_raw(packet.payload());
        }
    }
}

pub fn print_status(status: Status, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = StatusOutput {
                event: "error",
                status: status.as_str(),
                code: status.code(),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("error status={} code={}", status.as_str(), status.code());
        }
        OutputFormat::Raw => {
            eprintln!("{status}");
        }
    }
}

pub fn print_checksum_table(table: &ChecksumTable, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = TableOutput {
                polynomial: table.polynomial(),
                width_bits: table.width_bits(),
                entries: table.entries(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut grid = Table::new();
            grid.load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            let mut header = vec![String::new()];
            header.extend((0..16).map(|col| format!("_{col:X}")));
            grid.set_header(header);
            for (row, chunk) in table.entries().chunks(16).enumerate() {
                let mut cells = vec![format!("{row:X}_")];
                cells.extend(chunk.iter().map(|entry| format!("{entry:02X}")));
                grid.add_row(cells);
            }
            println!("{grid}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            print!("{}", table.render());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn hex_string(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_is_spaced_upper_case() {
        assert_eq!(hex_string(&[0x7E, 0x00, 0xab]), "7E 00 AB");
        assert_eq!(hex_string(&[]), "");
    }

    #[test]
    fn preview_marks_binary() {
        assert_eq!(payload_preview(b"ok"), "ok");
        assert_eq!(payload_preview(&[0xff, 0xfe]), "<binary 2 bytes>");
    }
}
