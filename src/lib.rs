//! Water turbidity classification.
//!
//! Encoded photographs are decoded, cover-fitted to 256x256, center-cropped
//! to 224x224, gray-world balanced and standardized into a planar
//! `(3, 224, 224)` tensor. A deterministic scorer turns that tensor into a
//! distribution over six turbidity classes, from ultra cloudy to clear, each
//! with its expected NTU range.
//!
//! ```no_run
//! let bytes = std::fs::read("sample.jpg")?;
//! let result = turbidity::classify(&bytes)?;
//! println!("{} ({:.2})", result.label, result.confidence);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod ingest;
pub mod media;
pub mod ml;
pub mod utils;
pub mod worker;

pub use error::{Error, ErrorKind, Result};
pub use ml::classes::{NtuRange, TurbidityClass};
pub use ml::pipeline::{preprocess, PreprocessedTensor};
pub use ml::engine::predict;
pub use ml::result::{ClassProbability, PredictionResult};

/// Preprocesses encoded image bytes and scores the resulting tensor.
pub fn classify(bytes: &[u8]) -> Result<PredictionResult> {
    let tensor = preprocess(bytes)?;
    Ok(predict(&tensor))
}
