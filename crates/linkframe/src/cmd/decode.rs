use std::fs;
use std::io::Read;

use linkframe_frame::Status;
use linkframe_link::{Link, LinkConfig};
use linkframe_marshal::ValueType;
use linkframe_transport::MemoryTransport;
use tracing::{info, warn};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, link_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_frame, print_status, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat, config: LinkConfig) -> CliResult<i32> {
    if args.value_type == Some(ValueType::List) && args.list_format.is_none() {
        return Err(CliError::new(USAGE, "--as list requires --list-format"));
    }

    let input = read_input(&args)?;
    let bytes = if args.hex {
        parse_hex(&String::from_utf8_lossy(&input))?
    } else {
        input
    };

    let mut link = Link::with_config(MemoryTransport::new(), config)
        .map_err(|err| link_error("invalid configuration", err))?;
    // Errors are printed as events below instead of logged.
    link.set_debug(false);
    link.transport().inject(&bytes);

    let mut frames = 0usize;
    let mut errors = 0usize;
    let mut last = Status::NoData;

    loop {
        link.service()
            .map_err(|err| link_error("decode failed", err))?;

        match link.status() {
            Status::NewData(_) => {
                frames += 1;
                let packet = link.received();
                let value = args.value_type.and_then(|ty| {
                    packet
                        .read_value(ty, 0, Some(packet.len()), args.list_format)
                        .map_err(|err| warn!(id = packet.id(), "payload not decodable: {err}"))
                        .ok()
                });
                print_frame(&packet, value.as_ref(), format);
            }
            Status::NoData => break,
            Status::Continue => {}
            status => {
                errors += 1;
                print_status(status, format);
            }
        }
        last = link.status();
    }

    if last == Status::Continue {
        warn!("trailing bytes did not complete a frame");
    }
    info!(frames, errors, "decode finished");

    Ok(if errors > 0 { DATA_INVALID } else { SUCCESS })
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    match &args.file {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}
