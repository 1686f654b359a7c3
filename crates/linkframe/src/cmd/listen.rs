use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use linkframe_link::{Link, LinkConfig, Received};
use linkframe_transport::{SerialTransport, Transport};
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{link_error, serial_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const READ_TIMEOUT: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(5);

pub fn run(args: ListenArgs, format: OutputFormat, config: LinkConfig) -> CliResult<i32> {
    let port = serialport::new(&args.port, args.baud)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|err| serial_error(&format!("failed opening {}", args.port), err))?;
    let mut link = Link::with_config(SerialTransport::new(port), config)
        .map_err(|err| link_error("invalid configuration", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let printed = Rc::new(Cell::new(0usize));
    install_handlers(&mut link, args.ids.as_deref(), format, &printed);
    info!(port = %args.port, baud = args.baud, "listening");

    while running.load(Ordering::SeqCst) {
        let received = link
            .tick()
            .map_err(|err| link_error("receive failed", err))?;

        if let Some(count) = args.count {
            if printed.get() >= count {
                return Ok(SUCCESS);
            }
        }
        if !received {
            thread::sleep(IDLE_POLL);
        }
    }

    Ok(SUCCESS)
}

/// Print packets whose id passes the filter and count them in `printed`.
///
/// Filtered-out ids get a silent handler so they are not reported as
/// unhandled packets.
fn install_handlers<T: Transport>(
    link: &mut Link<T>,
    ids: Option<&[u8]>,
    format: OutputFormat,
    printed: &Rc<Cell<usize>>,
) {
    for id in 0..=u8::MAX {
        if ids.is_some_and(|ids| !ids.contains(&id)) {
            link.on(id, |_: &Received<'_>| {});
            continue;
        }
        let printed = Rc::clone(printed);
        link.on(id, move |packet: &Received<'_>| {
            print_frame(packet, None, format);
            printed.set(printed.get().saturating_add(1));
        });
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
