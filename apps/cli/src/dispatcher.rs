//! Text command dispatcher
//!
//! A line is split on whitespace; the first token selects a command from the
//! registry and the rest are its arguments. Failures are logged and never end
//! the session.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::num::ParseIntError;

use kernsim_device::{DeviceDriver, DeviceError};
use kernsim_memory::{Handle, MemoryError, ThreadSafePool};
use thiserror::Error;

/// The components commands operate on
#[derive(Debug)]
pub struct Kernel {
    pub pool: ThreadSafePool,
    pub device: DeviceDriver,
}

/// What the session should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Reasons a command did not complete
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("usage: {usage}")]
    Usage { usage: &'static str },

    #[error("invalid number `{value}`: {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Resource exhaustion rather than bad input
    pub fn is_capacity(&self) -> bool {
        match self {
            Self::Memory(e) => e.is_retryable(),
            Self::Device(e) => e.is_retryable(),
            _ => false,
        }
    }
}

type Handler = fn(&Dispatcher, &[&str], &mut dyn Write) -> Result<Flow, CommandError>;

struct Command {
    usage: &'static str,
    summary: &'static str,
    handler: Handler,
}

/// Command registry bound to one [`Kernel`]
pub struct Dispatcher {
    kernel: Kernel,
    commands: BTreeMap<&'static str, Command>,
}

impl Dispatcher {
    pub fn new(kernel: Kernel) -> Self {
        let mut dispatcher = Self {
            kernel,
            commands: BTreeMap::new(),
        };
        dispatcher.register("help", "help", "Show available commands", help);
        dispatcher.register("allocate", "allocate <size>", "Allocate memory", allocate);
        dispatcher.register("free", "free <handle>", "Release an allocation", free);
        dispatcher.register(
            "submit",
            "submit <operation> <size>",
            "Submit a device request",
            submit,
        );
        dispatcher.register("stats", "stats", "Show system statistics", stats);
        dispatcher.register("status", "status", "Show device status", status);
        dispatcher.register("exit", "exit", "Exit the program", exit);
        dispatcher.register("quit", "quit", "Exit the program", exit);
        dispatcher
    }

    fn register(
        &mut self,
        name: &'static str,
        usage: &'static str,
        summary: &'static str,
        handler: Handler,
    ) {
        self.commands.insert(
            name,
            Command {
                usage,
                summary,
                handler,
            },
        );
    }

    #[cfg(test)]
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn into_kernel(self) -> Kernel {
        self.kernel
    }

    /// Write the command list to `out`
    pub fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Available commands:")?;
        for command in self.commands.values() {
            writeln!(out, "  {:<28} {}", command.usage, command.summary)?;
        }
        Ok(())
    }

    /// Run one input line
    pub fn execute(&self, line: &str, out: &mut dyn Write) -> Flow {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Flow::Continue;
        };
        let args: Vec<&str> = tokens.collect();

        let Some(command) = self.commands.get(name) else {
            tracing::warn!("Unknown command: {name}");
            return Flow::Continue;
        };

        match (command.handler)(self, &args, out) {
            Ok(flow) => flow,
            Err(e) if e.is_capacity() => {
                tracing::warn!("{name} failed: {e}");
                Flow::Continue
            }
            Err(e) => {
                tracing::error!("{name} failed: {e}");
                Flow::Continue
            }
        }
    }
}

fn parse_number<T: std::str::FromStr<Err = ParseIntError>>(value: &str) -> Result<T, CommandError> {
    value.parse().map_err(|source| CommandError::InvalidNumber {
        value: value.to_owned(),
        source,
    })
}

fn help(dispatcher: &Dispatcher, _: &[&str], out: &mut dyn Write) -> Result<Flow, CommandError> {
    dispatcher.help(out)?;
    Ok(Flow::Continue)
}

fn allocate(dispatcher: &Dispatcher, args: &[&str], _: &mut dyn Write) -> Result<Flow, CommandError> {
    let [size] = args else {
        return Err(CommandError::Usage {
            usage: "allocate <size>",
        });
    };
    let size: usize = parse_number(size)?;

    match dispatcher.kernel.pool.allocate(size)? {
        Some(handle) => tracing::info!("Allocated {size} bytes at handle {handle}"),
        None => tracing::info!("Nothing allocated for size 0"),
    }
    Ok(Flow::Continue)
}

fn free(dispatcher: &Dispatcher, args: &[&str], _: &mut dyn Write) -> Result<Flow, CommandError> {
    let [handle] = args else {
        return Err(CommandError::Usage {
            usage: "free <handle>",
        });
    };
    let handle = Handle::from_offset(parse_number(handle)?);

    match dispatcher.kernel.pool.deallocate(handle) {
        Some(bytes) => tracing::info!("Freed {bytes} bytes at handle {handle}"),
        None => tracing::warn!("No allocation at handle {handle}"),
    }
    Ok(Flow::Continue)
}

fn submit(dispatcher: &Dispatcher, args: &[&str], _: &mut dyn Write) -> Result<Flow, CommandError> {
    let [operation, size] = args else {
        return Err(CommandError::Usage {
            usage: "submit <operation> <size>",
        });
    };
    let size: usize = parse_number(size)?;

    let id = dispatcher.kernel.device.try_submit(*operation, size)?;
    tracing::info!("Submitted device request {id}: {operation} with size {size}");
    Ok(Flow::Continue)
}

fn stats(dispatcher: &Dispatcher, _: &[&str], out: &mut dyn Write) -> Result<Flow, CommandError> {
    writeln!(out, "{}", dispatcher.kernel.pool.stats())?;
    writeln!(out, "{}", dispatcher.kernel.device.stats())?;
    Ok(Flow::Continue)
}

fn status(dispatcher: &Dispatcher, _: &[&str], out: &mut dyn Write) -> Result<Flow, CommandError> {
    writeln!(out, "Device status: {}", dispatcher.kernel.device.device_status())?;
    Ok(Flow::Continue)
}

fn exit(_: &Dispatcher, _: &[&str], _: &mut dyn Write) -> Result<Flow, CommandError> {
    Ok(Flow::Exit)
}

#[cfg(test)]
mod tests {
    use kernsim_device::DeviceConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Kernel {
            pool: ThreadSafePool::new(4096).unwrap(),
            device: DeviceDriver::new(DeviceConfig::instant().with_queue_capacity(2)).unwrap(),
        })
    }

    fn run(dispatcher: &Dispatcher, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = dispatcher.execute(line, &mut out);
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn blank_and_unknown_lines_continue() {
        let d = dispatcher();
        assert_eq!(run(&d, "   ").0, Flow::Continue);
        assert_eq!(run(&d, "defrag now").0, Flow::Continue);
        assert_eq!(d.kernel().pool.stats().used, 0);
    }

    #[test]
    fn allocate_and_free() {
        let d = dispatcher();
        run(&d, "allocate 1024");
        run(&d, "allocate 0");
        assert_eq!(d.kernel().pool.stats().used, 1024);

        run(&d, "free 0");
        assert_eq!(d.kernel().pool.stats().used, 0);
        run(&d, "free 0");
        assert_eq!(d.kernel().pool.stats().region_count, 1);
    }

    #[test]
    fn bad_arguments_do_not_change_state() {
        let d = dispatcher();
        run(&d, "allocate");
        run(&d, "allocate lots");
        run(&d, "allocate -5");
        run(&d, "allocate 99999");
        run(&d, "submit read");
        run(&d, "submit read big");
        assert_eq!(d.kernel().pool.stats().used, 0);
        assert_eq!(d.kernel().device.stats().submitted, 0);
    }

    #[test]
    fn full_queue_keeps_session_alive() {
        let d = dispatcher();
        assert_eq!(run(&d, "submit read 1").0, Flow::Continue);
        assert_eq!(run(&d, "submit read 1").0, Flow::Continue);
        assert_eq!(run(&d, "submit write 1").0, Flow::Continue);

        let stats = d.kernel().device.stats();
        assert_eq!((stats.queue_depth, stats.rejected), (2, 1));
    }

    #[test]
    fn reports_go_to_output() {
        let d = dispatcher();
        let (_, text) = run(&d, "stats");
        assert!(text.contains("Memory Pool Stats:"));
        assert!(text.contains("Device Driver Stats:"));

        let (_, text) = run(&d, "status");
        assert_eq!(text, "Device status: READY\n");

        let (_, text) = run(&d, "help");
        assert!(text.contains("submit <operation> <size>"));
        assert!(text.contains("quit"));
    }

    #[test]
    fn exit_and_quit() {
        let d = dispatcher();
        assert_eq!(run(&d, "exit").0, Flow::Exit);
        assert_eq!(run(&d, "  quit  ").0, Flow::Exit);
    }

    #[test]
    fn capacity_errors_are_classified() {
        let full: CommandError = DeviceError::QueueFull { capacity: 1 }.into();
        assert!(full.is_capacity());
        let usage = CommandError::Usage { usage: "x" };
        assert!(!usage.is_capacity());
    }
}
