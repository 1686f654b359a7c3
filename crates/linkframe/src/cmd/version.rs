use linkframe_frame::{DEFAULT_POLYNOMIAL, DEFAULT_TABLE_WIDTH, MAX_PAYLOAD, START_BYTE, STOP_BYTE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("linkframe {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let build = [
        ("name", "linkframe".to_string()),
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        (
            "target",
            option_env!("LINKFRAME_BUILD_TARGET")
                .unwrap_or("unknown")
                .to_string(),
        ),
        ("rustc", option_env!("RUSTC_VERSION").unwrap_or("unknown").to_string()),
        ("git_hash", option_env!("GIT_HASH").unwrap_or("unknown").to_string()),
        (
            "features",
            format!(
                "link={}, serial={}, cli=true",
                cfg!(feature = "link"),
                cfg!(feature = "serial")
            ),
        ),
    ];
    for (key, value) in build {
        println!("{key}: {value}");
    }

    // Wire parameters a peer must agree on.
    println!("frame: start=0x{START_BYTE:02X} stop=0x{STOP_BYTE:02X} max_payload={MAX_PAYLOAD}");
    println!("checksum: polynomial=0x{DEFAULT_POLYNOMIAL:02X} table_width={DEFAULT_TABLE_WIDTH}");

    Ok(SUCCESS)
}
