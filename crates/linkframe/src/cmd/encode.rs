use linkframe_frame::encode_packet;
use linkframe_link::LinkConfig;

use crate::cmd::{EncodeArgs, WireOutput};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{hex_string, print_raw};

pub fn run(args: EncodeArgs, config: &LinkConfig) -> CliResult<i32> {
    let payload = args.payload.resolve()?;
    let table = config
        .frame
        .build_table()
        .map_err(|err| frame_error("invalid checksum configuration", err))?;

    let wire = encode_packet(&table, args.id, &payload);
    tracing::debug!(id = args.id, len = payload.len(), wire_len = wire.len(), "encoded frame");

    match args.output {
        WireOutput::Hex => println!("{}", hex_string(&wire)),
        WireOutput::Raw => print_raw(&wire),
    }
    Ok(SUCCESS)
}
