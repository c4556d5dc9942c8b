//! Introspection bridge runner.
//!
//! This binary:
//! 1. Builds the demo world and the main-thread dispatcher
//! 2. Answers JSON tool calls read from stdin, one per line, on stdout
//! 3. Runs the host tick, draining queued tool work every frame
//!
//! Logs go to stderr so stdout stays a clean reply stream. The runner exits
//! on stdin EOF or Ctrl-C.

mod protocol;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TryRecvError, unbounded};
use probe_core::{BridgeConfig, IdentityCache, MainLoopDispatcher};
use probe_scene::{MainThreadDispatcher, demo_world};
use probe_tools::{BridgeTools, ToolRegistry};
use tracing::{error, info};

/// Why the tick loop should stop.
#[derive(Debug)]
enum Shutdown {
    InputClosed,
    Interrupted,
}

fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("probe_runner=info".parse()?)
                .add_directive("probe_tools=info".parse()?),
        )
        .init();

    info!("Starting introspection bridge");

    let config = BridgeConfig::from_env();
    let target_fps: f32 = std::env::var("TARGET_FPS")
        .ok()
        .and_then(|fps| fps.parse().ok())
        .filter(|fps: &f32| *fps > 0.0)
        .unwrap_or(20.0);
    info!(?config, target_fps, "configuration");

    let mut world = demo_world()?;

    // The dispatcher's home object survives scene loads like any other
    // DontDestroyOnLoad root.
    let marker = world.spawn_in_active("ProbeBridge_MainThreadDispatcher")?;
    world.dont_destroy_on_load(&marker)?;
    let counters = world.add_component(&marker, MainThreadDispatcher::default());

    let dispatcher = MainLoopDispatcher::new();
    let cache = Arc::new(IdentityCache::new());
    let registry = ToolRegistry::new(BridgeTools::new(dispatcher.handle(), cache, &config));
    info!("Registered {} tools", registry.list().len());

    let (shutdown_tx, shutdown_rx) = unbounded::<Shutdown>();

    let interrupt_tx = shutdown_tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Shutdown::Interrupted);
    })?;

    thread::Builder::new()
        .name("probe-stdin".to_owned())
        .spawn(move || input_thread(&registry, &shutdown_tx))?;

    // Run host loop
    let target_delta = Duration::from_secs_f32(1.0 / target_fps);
    let mut last_tick = Instant::now();

    loop {
        let start = Instant::now();

        match shutdown_rx.try_recv() {
            Ok(reason) => {
                info!(?reason, "Shutting down...");
                break;
            }
            Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        let stats = dispatcher.drain(&mut world);
        if stats.executed + stats.failed > 0 {
            let mut counters = counters.write();
            counters.drained_actions += stats.executed as u64;
            counters.failed_actions += stats.failed as u64;
        }

        world.update(start.duration_since(last_tick).as_secs_f32());
        last_tick = start;

        // Sleep to maintain target FPS
        let elapsed = start.elapsed();
        if elapsed < target_delta {
            thread::sleep(target_delta - elapsed);
        }
    }

    info!(
        frames = world.frame(),
        pending = dispatcher.pending(),
        "host loop stopped"
    );
    Ok(())
}

/// Read requests until stdin closes, replying on stdout.
fn input_thread(registry: &ToolRegistry, shutdown: &Sender<Shutdown>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };
        let Some(reply) = protocol::handle_line(registry, &line) else {
            continue;
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{reply}").and_then(|()| stdout.flush()) {
            error!("Failed to write reply: {}", e);
            break;
        }
    }
    let _ = shutdown.send(Shutdown::InputClosed);
}
