//! kernsim - interactive front end for the pool allocator and device queue

mod cli;
mod config;
mod dispatcher;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kernsim_device::DeviceDriver;
use kernsim_log::TracingSink;
use kernsim_memory::{MemoryPool, ThreadSafePool};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::dispatcher::{Dispatcher, Flow, Kernel};

/// Commands run by `--test`
const TEST_SEQUENCE: &[&str] = &[
    "allocate 1024",
    "submit read 512",
    "stats",
    "allocate 2048",
    "submit write 1024",
    "stats",
    "exit",
];

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli)?;
    let _log = kernsim_log::init(config.log_config()).context("failed to initialise logging")?;
    tracing::info!("Kernel simulation starting");

    let pool = MemoryPool::with_config(config.pool_config())
        .context("failed to create memory pool")?
        .with_sink(Arc::new(TracingSink::new("pool")));
    let device = DeviceDriver::new(config.device_config())
        .context("failed to create device driver")?
        .with_sink(Arc::new(TracingSink::new("device")));
    device.start().context("failed to start device driver")?;
    tracing::info!("Device driver initialized");

    let dispatcher = Dispatcher::new(Kernel {
        pool: ThreadSafePool::from(pool),
        device,
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.test {
        tracing::info!("Running in test mode");
        run_sequence(&dispatcher, TEST_SEQUENCE, &mut out);
    } else {
        dispatcher.help(&mut out)?;
        run_interactive(&dispatcher, io::stdin().lock(), &mut out)?;
    }
    out.flush()?;

    let kernel = dispatcher.into_kernel();
    kernel
        .device
        .shutdown()
        .context("device driver did not shut down cleanly")?;
    tracing::info!("Kernel simulation shutting down");
    Ok(())
}

fn run_sequence(dispatcher: &Dispatcher, commands: &[&str], out: &mut dyn Write) {
    for command in commands {
        tracing::info!("Test executing: {command}");
        if dispatcher.execute(command, out) == Flow::Exit {
            break;
        }
    }
}

/// Prompt and execute lines until `exit` or end of input
fn run_interactive(
    dispatcher: &Dispatcher,
    input: impl BufRead,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            return Ok(());
        };
        if dispatcher.execute(&line?, out) == Flow::Exit {
            return Ok(());
        }
    }
}
