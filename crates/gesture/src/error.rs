use thiserror::Error;

#[derive(Error, Debug)]
pub enum GestureError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No contour found in mask")]
    NoContourFound,

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("ROI {roi_width}x{roi_height} at ({left}, {top}) does not fit a {frame_width}x{frame_height} frame")]
    RoiOutOfBounds {
        left: u32,
        top: u32,
        roi_width: u32,
        roi_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid font: {0}")]
    Font(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GestureError>;
