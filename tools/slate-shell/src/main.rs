//! Command-line host for Slate programs
//!
//! Loads a script into an in-memory VFS, subscribes a console observer to
//! the message bus, and drives the cooperative clock on wall time until
//! the program exits, fails, or runs out of scheduled work.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::info;
use tracing_subscriber::EnvFilter;

use slate_bus::BusMessage;
use slate_proc::{Pid, ProcessStatus};
use slate_runtime::Runtime;
use slate_vfs::{MemoryVfs, Vfs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(script_path) = args.next() else {
        eprintln!("usage: slate-shell <script.rhai> [--budget-ms <n>]");
        std::process::exit(2);
    };
    let mut budget_ms: u64 = 10_000;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--budget-ms" => {
                budget_ms = args
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(budget_ms);
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let source = std::fs::read_to_string(&script_path)?;
    let name = std::path::Path::new(&script_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("program.rhai");
    let vfs = Rc::new(MemoryVfs::new());
    vfs.mkdir_p("/home")?;
    let vpath = format!("/home/{name}");
    vfs.write_file(&vpath, source.as_bytes())?;

    let runtime = Runtime::new(vfs);

    // The first allocation is deterministic, so the observer can subscribe
    // before spawn and catch top-level output (the bus keeps no history).
    let pid = Pid(1);
    runtime.bus().add_listener(
        pid,
        Rc::new(|payload: &str| match serde_json::from_str::<BusMessage>(payload) {
            Ok(BusMessage::Log(text)) => println!("{text}"),
            Ok(BusMessage::Warn(text)) => println!("[warn] {text}"),
            Ok(BusMessage::Error(failure)) => eprintln!("{}", failure.report()),
            Ok(BusMessage::Message(value)) => println!("[message] {value}"),
            Ok(BusMessage::Exit { code }) => println!("[exit] code {code}"),
            Ok(BusMessage::CloseRequest) => println!("[close-request]"),
            Err(_) => println!("[?] {payload}"),
        }),
    );

    let started = Instant::now();
    let spawned = runtime.spawn(&vpath, 0)?;
    assert_eq!(spawned, pid);

    while runtime.process(pid).is_some() {
        let now_ms = started.elapsed().as_millis() as u64;
        if now_ms > budget_ms {
            info!("time budget exhausted, stopping program");
            if !runtime.stop(pid)? {
                runtime.kill(pid)?;
            }
            break;
        }
        if runtime.process(pid).map(|p| p.status) == Some(ProcessStatus::Error) {
            // Already reported through the observer.
            break;
        }

        runtime.advance_to(now_ms);
        runtime.run_frame(now_ms);
        if !runtime.has_pending_work() {
            break;
        }

        // Sleep until the next timer, capped to keep a frame cadence.
        let wake = runtime.next_due().unwrap_or(now_ms + 16).min(now_ms + 16);
        let sleep_ms = wake.saturating_sub(now_ms).max(1);
        std::thread::sleep(Duration::from_millis(sleep_ms));
    }
    Ok(())
}
