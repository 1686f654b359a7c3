use std::time::Duration;

use linkframe_link::{Link, LinkConfig};
use linkframe_transport::SerialTransport;
use tracing::info;

use crate::cmd::SendArgs;
use crate::exit::{link_error, serial_error, CliResult, SUCCESS};

const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

pub fn run(args: SendArgs, config: LinkConfig) -> CliResult<i32> {
    let payload = args.payload.resolve()?;

    let port = serialport::new(&args.port, args.baud)
        .timeout(WRITE_TIMEOUT)
        .open()
        .map_err(|err| serial_error(&format!("failed opening {}", args.port), err))?;
    let mut link = Link::with_config(SerialTransport::new(port), config)
        .map_err(|err| link_error("invalid configuration", err))?;

    let len = link
        .write_raw(&payload, 0)
        .map_err(|err| link_error("payload rejected", err))?;
    let sent = link
        .send(len, args.id)
        .map_err(|err| link_error("send failed", err))?;

    info!(port = %args.port, id = args.id, len = sent, "packet sent");
    Ok(SUCCESS)
}
