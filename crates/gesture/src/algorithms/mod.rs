pub mod kmeans;
pub mod segmentation;
pub mod extraction;
pub mod simplification;
pub mod hull;
pub mod defects;
pub mod classification;

pub use kmeans::*;
pub use segmentation::*;
pub use extraction::*;
pub use simplification::*;
pub use hull::*;
pub use defects::*;
pub use classification::*;
