use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error};

use crate::ml::result::PredictionResult;
use crate::utils::config::Settings;

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Prediction(PredictionResult),
    Failed { error: String },
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

pub fn classify_file(path: &Path, settings: &Settings) -> Result<PredictionResult> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();
    if size > settings.max_image_bytes as u64 {
        bail!(
            "{:?} is {} bytes, above the maximum of {} bytes",
            path,
            size,
            settings.max_image_bytes
        );
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let result = crate::classify(&bytes)?;
    Ok(result)
}

/// Classifies every path in parallel. Reports come back in input order.
pub fn classify_all(paths: &[PathBuf], settings: &Settings, show_progress: bool) -> Vec<FileReport> {
    let pb = if show_progress && paths.len() > 1 {
        let pb = ProgressBar::new(paths.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let reports = paths
        .par_iter()
        .map(|path| {
            let outcome = match classify_file(path, settings) {
                Ok(result) => {
                    debug!("{:?}: {} ({:.3})", path, result.class.id(), result.confidence);
                    Outcome::Prediction(result)
                }
                Err(e) => {
                    error!("Failed to classify {:?}: {:#}", path, e);
                    Outcome::Failed {
                        error: format!("{:#}", e),
                    }
                }
            };
            pb.inc(1);
            FileReport {
                path: path.clone(),
                outcome,
            }
        })
        .collect();

    pb.finish_and_clear();
    reports
}
