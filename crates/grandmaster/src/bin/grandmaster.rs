use clap::{Args, Parser, Subcommand, ValueEnum};
use grandmaster::detect::detect_from_files;
use grandmaster_core::{OutputSink, SharedSink, StdoutSink};
use grandmaster_devices::sim::sim_pair;
use grandmaster_devices::{list_ports, DeviceManager, Link};
use grandmaster_game::{
    control_channel, default_button_handlers, ready_callback, spawn_line_reader, ControlInput,
    FileImageSource, GameConfig, HttpImageSource, ImageSource, Orchestrator,
};
use grandmaster_vision::{BoardDetector, RecordedScanner};
use std::error::Error;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "grandmaster", version, about = "Camera-guided chess robot")]
struct Cli {
    /// Log debug messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the game loop, reading commands from stdin.
    Run(RunArgs),
    /// Detect the board in a single frame and print it.
    Detect(DetectArgs),
    /// List serial ports with their USB serial numbers.
    Ports,
    /// Write the default configuration as JSON.
    InitConfig {
        #[arg(default_value = "grandmaster.json")]
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Game configuration (JSON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the in-memory controller simulator instead of serial ports.
    #[arg(long)]
    simulate: bool,

    /// Recorded tag detections replayed for every frame.
    #[arg(long)]
    detections: PathBuf,

    /// Read frames from this file instead of the camera URL.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DetectArgs {
    #[arg(long)]
    image: PathBuf,

    #[arg(long)]
    detections: PathBuf,

    /// Game configuration supplying the detector parameters.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Side::Black)]
    turn: Side,

    /// Write the annotated frame here.
    #[arg(long)]
    annotate: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Side {
    White,
    Black,
}

impl From<Side> for shakmaty::Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => shakmaty::Color::White,
            Side::Black => shakmaty::Color::Black,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, json: bool) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbose;
        let _ = tracing_log::LogTracer::init();
        grandmaster_core::init_tracing(json);
    }
    #[cfg(not(feature = "tracing"))]
    {
        if json {
            eprintln!("--json-logs needs the `tracing` feature; using plain logs");
        }
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        let _ = grandmaster_core::init_with_level(level);
    }
}

fn dispatch(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Run(args) => run(args),
        Command::Detect(args) => detect(args),
        Command::Ports => ports(),
        Command::InitConfig { path } => {
            GameConfig::default().write_json(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(GameConfig::load_json(path)?),
        None => Ok(GameConfig::default()),
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let sink: SharedSink = Arc::new(StdoutSink);
    let (tx, rx) = control_channel();

    let detector = BoardDetector::new(
        config.detector.clone(),
        RecordedScanner::load_json(&args.detections)?,
    );
    let source: Box<dyn ImageSource> = match &args.image {
        Some(path) => Box::new(FileImageSource::new(path)),
        None => Box::new(HttpImageSource::new(&config.camera)?),
    };

    if args.simulate {
        let (gantry, board, _bench) = sim_pair();
        let devices = DeviceManager::with_links(
            gantry,
            board,
            &config.devices,
            default_button_handlers(&tx)?,
            sink.clone(),
        );
        play(devices, detector, source, tx, rx, config, sink)
    } else {
        let devices =
            DeviceManager::connect(&config.devices, default_button_handlers(&tx)?, sink.clone())?;
        play(devices, detector, source, tx, rx, config, sink)
    }
}

fn play<L: Link, S: ImageSource>(
    mut devices: DeviceManager<L>,
    detector: BoardDetector,
    source: S,
    tx: Sender<ControlInput>,
    rx: Receiver<ControlInput>,
    config: GameConfig,
    sink: SharedSink,
) -> Result<(), Box<dyn Error>> {
    devices.set_ready_callback(ready_callback(&tx));
    sink.emit("Waiting for controllers...");
    let _reader = spawn_line_reader(BufReader::new(io::stdin()), tx, sink.clone());
    let mut game = Orchestrator::new(devices, detector, source, rx, config, sink);
    game.run();
    Ok(())
}

fn detect(args: DetectArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_ref())?;
    let offline = detect_from_files(
        &args.image,
        &args.detections,
        &config.detector,
        args.turn.into(),
    )?;
    log::info!(
        "{} tags, {} pieces placed",
        offline.report.detections.len(),
        offline.board.piece_count()
    );
    println!("{}", offline.board.render(matches!(args.turn, Side::Black)));
    if let Some(path) = &args.annotate {
        offline.save_annotated(path)?;
        println!("annotated frame written to {}", path.display());
    }
    Ok(())
}

fn ports() -> Result<(), Box<dyn Error>> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("no serial ports found");
    }
    for port in ports {
        println!(
            "{}\tserial={}\tproduct={}",
            port.path,
            port.serial_number.as_deref().unwrap_or("-"),
            port.product.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
