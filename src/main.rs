//! Barcode Scan CLI
//!
//! Command-line interface for listing cameras, scanning live and decoding
//! still images with the barcode scanning pipeline.

use barcode_scan::{
    capture::{CameraError, ConfigError, FileConfig, Frame, FrameSource, MockCamera},
    decode::{decode_first, RxingDecoder},
    preprocess::Preprocessor,
    scan::{Detection, ScanController, ScanOptions, ScanSession},
    validate::ResultValidator,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "barcode-scan", version, about = "Live camera barcode scanner")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, global = true)]
    metrics_port: Option<u16>,

    /// Print format, candidate and frame sequence with each detection.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List video input devices.
    Devices {
        /// List the scripted mock devices instead of real cameras.
        #[arg(long)]
        mock: bool,
    },
    /// Scan live until Ctrl-C.
    Scan {
        /// Device id to open; defaults to the back-facing camera.
        #[arg(short, long)]
        device: Option<String>,
        /// Use the mock camera.
        #[arg(long)]
        mock: bool,
        /// Stop after this many seconds.
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    /// Decode a still image through the candidate chain.
    Decode {
        /// Image file (PNG or JPEG).
        image: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("camera: {0}")]
    Camera(#[from] CameraError),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("no barcode found in {0}")]
    NoSymbol(PathBuf),
}

type DynSource = Box<dyn FrameSource>;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    if cli.verbose {
        config.output.verbose = true;
    }
    if let Some(port) = cli.metrics_port {
        config.output.metrics_port = port;
    }

    match cli.command {
        Command::Devices { mock } => list_devices(mock),
        Command::Scan {
            device,
            mock,
            duration_secs,
        } => scan(&config, device.as_deref(), mock, duration_secs.map(Duration::from_secs)),
        Command::Decode { image } => decode_image(&config, image),
    }
}

fn open_source(mock: bool) -> DynSource {
    if mock {
        Box::new(MockCamera::new())
    } else {
        native_source()
    }
}

#[cfg(feature = "camera")]
fn native_source() -> DynSource {
    Box::new(barcode_scan::capture::NativeCamera::new())
}

#[cfg(not(feature = "camera"))]
fn native_source() -> DynSource {
    warn!("Built without the `camera` feature; using mock camera");
    Box::new(MockCamera::new())
}

fn list_devices(mock: bool) -> Result<(), CliError> {
    let mut source = open_source(mock);
    let devices = source.enumerate_devices();

    if devices.is_empty() {
        println!("No video input devices found");
        return Ok(());
    }
    for device in devices {
        println!("{}\t{}\t{}", device.id, device.facing, device.label);
    }
    Ok(())
}

fn print_detection(detection: &Detection, verbose: bool) {
    if verbose {
        println!(
            "{}\t{}\t{}\tframe={}",
            detection.detected_at.to_rfc3339(),
            detection,
            detection.candidate.map(|c| c.as_str()).unwrap_or("-"),
            detection.frame_sequence
        );
    } else {
        println!("{}", detection.text);
    }
}

fn scan(
    config: &FileConfig,
    device: Option<&str>,
    mock: bool,
    duration: Option<Duration>,
) -> Result<(), CliError> {
    info!("Barcode Scan v{}", barcode_scan::VERSION);

    let controller: Arc<ScanController<DynSource, RxingDecoder>> = Arc::new(ScanController::rxing(
        open_source(mock),
        config.decode.clone(),
        ScanOptions::from_file_config(config),
    ));

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    serve_metrics(config.output.metrics_port, &controller);

    let verbose = config.output.verbose;
    controller.start(device, move |detection| print_detection(detection, verbose))?;
    if mock {
        info!("Mock camera frames carry no symbols; press Ctrl-C to stop");
    }

    match duration {
        Some(limit) => match stop_rx.recv_timeout(limit) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => info!("Interrupted"),
            Err(RecvTimeoutError::Timeout) => info!(secs = limit.as_secs(), "Scan duration elapsed"),
        },
        None => {
            let _ = stop_rx.recv();
            info!("Interrupted");
        }
    }

    controller.stop();

    let stats = controller.stats();
    info!(
        ticks = stats.ticks,
        decodes = stats.hits(),
        rejected = stats.rejected,
        detections = stats.delivered,
        "Scan finished"
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn serve_metrics(port: u16, controller: &Arc<ScanController<DynSource, RxingDecoder>>) {
    use barcode_scan::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig, MetricsSnapshot};

    if port == 0 {
        return;
    }

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!(error = %e, "Failed to create metrics registry");
            return;
        }
    };
    let scanner = Arc::clone(controller);
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry, move || {
        MetricsSnapshot::from_scanner(scanner.state(), scanner.stats())
    });

    let spawned = std::thread::Builder::new()
        .name("metrics-server".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "Failed to start metrics runtime");
                    return;
                }
            };
            if let Err(e) = runtime.block_on(server.run()) {
                warn!(error = %e, "Metrics server stopped");
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to spawn metrics server thread");
    }
}

#[cfg(not(feature = "metrics"))]
fn serve_metrics(port: u16, _controller: &Arc<ScanController<DynSource, RxingDecoder>>) {
    if port != 0 {
        warn!(port, "Built without the `metrics` feature; metrics server disabled");
    }
}

fn decode_image(config: &FileConfig, path: PathBuf) -> Result<(), CliError> {
    let luma = image::open(&path)?.to_luma8();
    let (width, height) = luma.dimensions();
    let frame = Frame::new(luma.into_raw(), width, height, 0);

    let preprocessor = Preprocessor::new(config.preprocess.clone());
    let mut decoder = RxingDecoder::new(&config.decode);

    let result = decode_first(&mut decoder, preprocessor.candidates(&frame))
        .ok_or_else(|| CliError::NoSymbol(path.clone()))?;

    let validator = ResultValidator::new();
    if let Err(rejection) = validator.check(&result, &ScanSession::default()) {
        warn!(reason = %rejection, "Decoded value failed validation");
    }

    if config.output.verbose {
        println!(
            "{}\t{}\t{}",
            result.text,
            result.format.map(|f| f.as_str()).unwrap_or("-"),
            result.context.candidate.map(|c| c.as_str()).unwrap_or("-"),
        );
    } else {
        println!("{}", result.text);
    }
    Ok(())
}
