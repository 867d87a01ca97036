use clap::{Parser, Subcommand};
use cli::{list_frames, load_frame, DirectorySink, SessionConfig};
use color_eyre::eyre::Result;
use gesture::{load_font, DetectorConfig, GestureDetector, RoiPosition};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run gesture detection over the frames named in a session config
    Detect {
        /// Path to the TOML or JSON session configuration
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Classify a single image and print the label
    Classify {
        /// Path to the input frame
        #[arg(short, long)]
        input: PathBuf,
        /// ROI position: left or right
        #[arg(long, default_value = "left")]
        roi: String,
        /// Seed for the segmentation random source
        #[arg(long)]
        seed: Option<u64>,
        /// Flip the frame horizontally first
        #[arg(long)]
        mirror: bool,
    },
    /// Print the JSON schema of the session configuration
    Schema,
    /// Write a default session configuration (.toml or .json)
    InitConfig {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Detect { config } => {
            run_session(config)?;
        }
        Commands::Classify { input, roi, seed, mirror } => {
            classify(input, roi, *seed, *mirror)?;
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(SessionConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::InitConfig { output } => {
            SessionConfig::default().to_file(output)?;
            info!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn run_session(config_path: &Path) -> Result<()> {
    let session = SessionConfig::from_file(config_path)?;
    info!("Session: {:?}", session);

    let mut detector = GestureDetector::from_config(&session.detector)?;
    info!("{}", detector.info());

    let font = match &session.font_path {
        Some(path) => Some(load_font(path)?),
        None => {
            info!("No font_path configured; drawing labels with the bundled font");
            None
        }
    };

    let frames = list_frames(&session.input_path)?;
    info!("Processing {} frames from {}", frames.len(), session.input_path);

    let mut sink = DirectorySink::create(&session.output_dir)?;
    let mut labelled = 0usize;

    for path in &frames {
        let frame_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "frame".to_string());

        let frame = match load_frame(path, session.mirror) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Skipping frame: {}", err);
                continue;
            }
        };

        match detector.detect_into(&frame_name, &frame, font.as_ref(), &mut sink) {
            Ok(Some(label)) => {
                labelled += 1;
                info!("{}: {}", frame_name, label);
            }
            Ok(None) => info!("{}: no hand found", frame_name),
            Err(err) => error!("{}: detection failed: {}", frame_name, err),
        }
    }

    sink.finish()?;
    info!(
        "✅ Processed {} frames ({} labelled), results in {}",
        frames.len(),
        labelled,
        session.output_dir
    );
    Ok(())
}

fn classify(input: &Path, roi: &str, seed: Option<u64>, mirror: bool) -> Result<()> {
    let config = DetectorConfig {
        roi_position: RoiPosition::from_name(roi)?.to_string(),
        seed,
        ..Default::default()
    };
    let mut detector = GestureDetector::from_config(&config)?;

    let frame = load_frame(input, mirror)?;
    let analysis = detector.analyze(&frame)?;

    match analysis.label() {
        Some(label) => println!("{label}"),
        None => println!("no hand found"),
    }
    info!("{}", serde_json::to_string(&analysis.summary())?);
    Ok(())
}
