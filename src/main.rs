use clap::Parser;
use log::{error, info, warn};
use lunix_cache::config::Config;
use lunix_cache::input::simulation::run_sensor_simulation;
use lunix_cache::{LunixError, SensorRegistry, SessionOptions, Target};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Stream a sensor measurement the way `cat /dev/lunix0-temp` would.
#[derive(Parser, Debug)]
#[command(name = "lunix-cat", version, about)]
struct Cli {
    /// Device node to read, e.g. lunix0-temp or lunix3-light
    #[arg(default_value = "lunix0-temp")]
    node: Target,

    /// Print raw codes instead of converted values
    #[arg(long)]
    raw: bool,

    /// Poll instead of parking while no fresh sample is available
    #[arg(long)]
    nonblock: bool,

    /// Stop after this many samples
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Bytes requested per read
    #[arg(long, default_value_t = 64)]
    chunk: usize,

    /// Number of sensors in the registry
    #[arg(long, env = "LUNIX_SENSOR_COUNT")]
    sensors: Option<usize>,

    /// Simulated acquisition period in milliseconds
    #[arg(long, env = "LUNIX_SIM_INTERVAL_MS")]
    interval_ms: Option<u64>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Write one chunk and flush it so partial samples show up immediately.
async fn emit<W: AsyncWrite + Unpin>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes).await?;
    out.flush().await
}

/// Wait for the simulation task to stop. Returns `false` if it panicked or was aborted.
async fn join_simulation(simulation: JoinHandle<()>) -> bool {
    match simulation.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Sensor simulation task ended abnormally: {}", e);
            false
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(sensors) = cli.sensors {
        config.registry.sensor_count = sensors;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.simulation.interval_ms = interval_ms;
    }
    info!("Configuration loaded:");
    info!("  Sensors: {}", config.registry.sensor_count);
    info!(
        "  Simulation: {} ({} ms)",
        config.simulation.enabled, config.simulation.interval_ms
    );

    let registry = match SensorRegistry::new(config.registry.sensor_count) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            error!("Failed to initialize sensor registry: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let simulation = config
        .simulation
        .enabled
        .then(|| run_sensor_simulation(registry.clone(), config.simulation.interval()));

    let mut options = if cli.raw {
        SessionOptions::raw()
    } else {
        SessionOptions::cooked()
    };
    if cli.nonblock {
        options = options.nonblocking();
    }

    let session = match registry.open(cli.node, options) {
        Ok(session) => session,
        Err(e) => {
            error!("Cannot open {}: {}", cli.node, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Reading {} - press Ctrl+C to exit", cli.node);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
            cancel.cancel();
        })
    };

    let mut stdout = tokio::io::stdout();
    let mut buf = vec![0u8; cli.chunk.max(1)];
    let mut samples = 0usize;
    let mut status = ExitCode::SUCCESS;

    loop {
        match session.read(&mut buf, &cancel).await {
            Ok(count) => {
                if let Err(e) = emit(&mut stdout, &buf[..count]).await {
                    error!("Failed to write to stdout: {}", e);
                    status = ExitCode::FAILURE;
                    break;
                }

                // Cursor back at 0 means a whole sample was delivered.
                if session.position().await == 0 {
                    samples += 1;
                    if cli.count.is_some_and(|limit| samples >= limit) {
                        break;
                    }
                }
            }
            Err(LunixError::WouldBlock) => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(config.simulation.interval() / 4) => {}
                }
            }
            Err(LunixError::Cancelled) => break,
            Err(e) => {
                warn!("Read from {} failed: {}", cli.node, e);
                status = ExitCode::FAILURE;
                break;
            }
        }
    }

    session.close();
    registry.shutdown();
    ctrl_c.abort();
    if let Some(simulation) = simulation {
        join_simulation(simulation).await;
    }

    info!("Read {} samples from {}", samples, cli.node);
    status
}
