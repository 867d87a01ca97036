use gesture::{Detection, DetectorConfig, FrameSink, GestureError};

use image::RgbImage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions accepted as frames
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Gesture(#[from] GestureError),
    #[error("Failed to capture frame {path}: {source}")]
    CaptureFailure {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("Input path not found: {0}")]
    MissingInput(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One detection run: where frames come from, where results go, how to detect
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionConfig {
    /// A single image or a directory of frames (processed in name order)
    pub input_path: String,
    pub output_dir: String,
    /// Flip every frame horizontally before detection, as a selfie camera would
    #[serde(default)]
    pub mirror: bool,
    /// Font used to draw the gesture label; the bundled font when absent
    #[serde(default)]
    pub font_path: Option<String>,
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input_path: "frames".to_string(),
            output_dir: "output".to_string(),
            mirror: true,
            font_path: None,
            detector: DetectorConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load SessionConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load SessionConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Load SessionConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load SessionConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert SessionConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert SessionConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Save configuration, picking the format from the file extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path_ref = path.as_ref();
        let content = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path_ref, content)?;
        Ok(())
    }
}

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Frames to process: the file itself, or every image in the directory sorted by name
pub fn list_frames<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>, CliError> {
    let input = input.as_ref();
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(CliError::MissingInput(input.display().to_string()));
    }

    let mut frames: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_frame(path))
        .collect();
    frames.sort();
    Ok(frames)
}

/// Read one frame as RGB, optionally mirrored
pub fn load_frame<P: AsRef<Path>>(path: P, mirror: bool) -> Result<RgbImage, CliError> {
    let path = path.as_ref();
    let frame = image::open(path)
        .map_err(|source| CliError::CaptureFailure {
            path: path.display().to_string(),
            source,
        })?
        .to_rgb8();
    Ok(if mirror { image::imageops::flip_horizontal(&frame) } else { frame })
}

/// One line of the label report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportLine {
    pub frame: String,
    #[serde(flatten)]
    pub summary: gesture::FrameSummary,
}

/// Writes `<frame>_gesture.png` composites and a `labels.jsonl` report
pub struct DirectorySink {
    output_dir: PathBuf,
    report: BufWriter<File>,
}

impl DirectorySink {
    pub const REPORT_FILE: &'static str = "labels.jsonl";

    pub fn create<P: AsRef<Path>>(output_dir: P) -> Result<Self, CliError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        let report = BufWriter::new(File::create(output_dir.join(Self::REPORT_FILE))?);
        Ok(Self { output_dir, report })
    }

    pub fn composite_path(&self, frame_name: &str) -> PathBuf {
        self.output_dir.join(format!("{frame_name}_gesture.png"))
    }

    pub fn finish(mut self) -> Result<(), CliError> {
        self.report.flush()?;
        Ok(())
    }
}

impl FrameSink for DirectorySink {
    fn present(&mut self, frame_name: &str, detection: &Detection) -> gesture::Result<()> {
        detection.composite.save(self.composite_path(frame_name))?;

        let line = ReportLine {
            frame: frame_name.to_string(),
            summary: detection.analysis.summary(),
        };
        serde_json::to_writer(&mut self.report, &line)?;
        self.report.write_all(b"\n")?;
        Ok(())
    }
}
