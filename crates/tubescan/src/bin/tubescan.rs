//! tubescan CLI: resolve decoded tube symbols into rack positions.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use tubescan::decode::{BlobPreset, DecodeSettings};
use tubescan::{scan, DetectionsFile, ScanConfig, ScanError, ScanReport};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tubescan")]
#[command(about = "Locate data-matrix test tubes in a 12x8 rack scan")]
#[command(version)]
struct Cli {
    /// Diagnostic verbosity: 0 warnings only, 1 info, 2 debug, 3+ trace.
    #[arg(long, global = true, default_value_t = 0)]
    debug: u8,

    /// Write diagnostics to a file (default `tubescan.log`) instead of stderr.
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        default_missing_value = tubescan::core::DEFAULT_LOG_FILE
    )]
    debug_file: Option<PathBuf>,

    /// Emit logs as JSON (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a detections file into a rack table.
    Resolve(ResolveArgs),

    /// Write a config file with default settings.
    InitConfig {
        /// Destination path.
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the decoder settings and blob presets used at a resolution.
    Settings {
        #[arg(long, default_value_t = 300)]
        dpi: u32,
    },
}

#[derive(Debug, Clone, Args)]
struct ResolveArgs {
    /// JSON file with `image` geometry and decoded `detections`.
    #[arg(long)]
    input: PathBuf,

    /// Scan config (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plate number (1 to 5); overrides the config.
    #[arg(long)]
    plate: Option<u8>,

    /// Center-to-center tube distance in inches; overrides the config.
    #[arg(long)]
    celldist: Option<f64>,

    /// Write a JSON report here.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print `plate,row,col,barcode` lines instead of the table.
    #[arg(long)]
    csv: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Resolve(args) => run_resolve(&args),
        Commands::InitConfig { out } => run_init_config(&out),
        Commands::Settings { dpi } => run_settings(dpi),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn level_for(debug: u8) -> LevelFilter {
    match debug {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    let level = level_for(cli.debug);
    if let Some(path) = &cli.debug_file {
        tubescan::core::init_with_file(level, path)?;
        return Ok(());
    }
    init_console(level, cli.json_logs);
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_console(level: LevelFilter, json: bool) {
    let _ = tracing_log::LogTracer::init();
    log::set_max_level(level);
    tubescan::core::init_tracing(json);
}

#[cfg(not(feature = "tracing"))]
fn init_console(level: LevelFilter, json: bool) {
    if json {
        eprintln!("warning: --json-logs needs the `tracing` feature; using plain logs");
    }
    let _ = tubescan::core::init_with_level(level);
}

// ── resolve ────────────────────────────────────────────────────────────

fn run_resolve(args: &ResolveArgs) -> CliResult<ExitCode> {
    let mut cfg = match &args.config {
        Some(path) => ScanConfig::load_json(path)?,
        None => ScanConfig::default(),
    };
    if let Some(plate) = args.plate {
        cfg.plate = plate;
    }
    if let Some(celldist) = args.celldist {
        cfg.resolver.cell_distance_in = celldist;
    }
    if let Some(output) = &args.output {
        cfg.output_path = Some(output.to_string_lossy().into_owned());
    }

    let input = DetectionsFile::load_json(&args.input)?;
    log::info!(
        "loaded {} detections ({}x{} @ {} dpi)",
        input.detections.len(),
        input.image.width,
        input.image.height,
        input.image.dpi
    );

    let mut report = ScanReport::new(cfg.plate, input.image, input.detections);
    let outcome = scan::resolve_detections(&report.detections, input.image, &cfg);

    let code = match outcome {
        Ok(res) => {
            if args.csv {
                print!("{}", res.grid.to_csv(cfg.plate));
            } else {
                print!("{}", res.grid.to_table());
            }
            report.set_resolution(res);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            report.set_error(&err);
            exit_code_for(&err)
        }
    };

    if cfg.output_path.is_some() {
        let path = cfg.output_path();
        report.write_json(&path)?;
        log::info!("report written to {}", path.display());
    }
    Ok(code)
}

/// 2: nothing decoded, 3: rack geometry did not resolve, 4: invalid input.
fn exit_code_for(err: &ScanError) -> ExitCode {
    match err {
        ScanError::Resolve(tubescan::ResolveError::ImageInvalid) => ExitCode::from(2),
        ScanError::Resolve(tubescan::ResolveError::PositionCalc(_)) => ExitCode::from(3),
        ScanError::InvalidPlateNumber(_)
        | ScanError::InvalidDpi(_)
        | ScanError::InvalidGrayBuffer { .. }
        | ScanError::Resolve(_) => ExitCode::from(4),
    }
}

// ── init-config ────────────────────────────────────────────────────────

fn run_init_config(out: &Path) -> CliResult<ExitCode> {
    ScanConfig::default().write_json(out)?;
    println!("wrote default config to {}", out.display());
    Ok(ExitCode::SUCCESS)
}

// ── settings ───────────────────────────────────────────────────────────

fn run_settings(dpi: u32) -> CliResult<ExitCode> {
    if dpi == 0 {
        return Err(ScanError::InvalidDpi(dpi).into());
    }
    let cfg = ScanConfig::default();
    let settings: DecodeSettings = cfg.decode_settings(dpi);
    println!("decoder settings at {dpi} dpi");
    println!("  min edge:        {} px", settings.min_edge_px);
    println!("  max edge:        {} px", settings.max_edge_px);
    println!(
        "  scan gap:        {} px ({} in)",
        settings.scan_gap_px, settings.scan_gap_in
    );
    println!("  square dev:      {} deg", settings.square_dev_deg);
    println!("  edge threshold:  {}", settings.edge_thresh);
    println!("  corrections:     {}", settings.corrections);

    for tube in [tubescan::TubeType::Standard, tubescan::TubeType::Nunc] {
        let p = BlobPreset::for_dpi(dpi, tube);
        println!(
            "blob preset {tube:?}: threshold {} min area {} rounds {} border {}",
            p.threshold, p.min_blob_area, p.rounds, p.border
        );
    }
    Ok(ExitCode::SUCCESS)
}
