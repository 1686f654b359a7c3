use linkframe_frame::FrameConfig;
use linkframe_link::LinkConfig;

use crate::cmd::TableArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_checksum_table, OutputFormat};

pub fn run(args: TableArgs, format: OutputFormat, config: &LinkConfig) -> CliResult<i32> {
    let frame = FrameConfig {
        polynomial: args.polynomial.unwrap_or(config.frame.polynomial),
        table_width: args.width.unwrap_or(config.frame.table_width),
    };
    let table = frame
        .build_table()
        .map_err(|err| frame_error("invalid checksum parameters", err))?;

    print_checksum_table(&table, format);
    Ok(SUCCESS)
}
