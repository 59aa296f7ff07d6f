//! Deterministic scorer.
//!
//! There is no learned model behind this engine. Class logits come from the
//! mean brightness of the image plus a small jitter drawn from a generator
//! seeded by the tensor itself, so identical inputs always produce identical
//! distributions. Every integer step uses 32-bit wrapping arithmetic; widening
//! any of it changes the outputs.

use crate::ml::classes::NUM_CLASSES;
use crate::ml::pipeline::{PreprocessedTensor, IMAGENET_MEAN, IMAGENET_STD};
use crate::ml::result::{build_result, PredictionResult};
use crate::ml::round_half_up;

const SEED_SAMPLES: usize = 256;
const MULBERRY_INCREMENT: u32 = 0x6d2b_79f5;
const DISTANCE_COEFFICIENT: f64 = 1.8;
const JITTER_AMPLITUDE: f64 = 0.3;

/// Scores a tensor and assembles the ranked result.
pub fn predict(tensor: &PreprocessedTensor) -> PredictionResult {
    build_result(&class_probabilities(tensor))
}

/// Probability for every class, in canonical class order.
pub fn class_probabilities(tensor: &PreprocessedTensor) -> [f64; NUM_CLASSES] {
    let center = center_class(brightness(tensor));
    let seed = tensor_seed(tensor.values());
    softmax(&logits(center, seed))
}

/// Mean of the de-normalized tensor, nominally in [0, 1].
pub fn brightness(tensor: &PreprocessedTensor) -> f64 {
    let view = tensor.view();
    let mut total = 0.0f64;
    for (c, plane) in view.outer_iter().enumerate() {
        for &value in plane.iter() {
            total += value as f64 * IMAGENET_STD[c] + IMAGENET_MEAN[c];
        }
    }
    total / tensor.len() as f64
}

/// Class index implied by brightness alone: `round((1 - brightness) * 5)`,
/// so darker tensors land on higher indices.
pub fn center_class(brightness: f64) -> usize {
    round_half_up((1.0 - brightness) * 5.0).clamp(0.0, (NUM_CLASSES - 1) as f64) as usize
}

/// Hashes up to 256 evenly spaced values of the tensor into a generator seed.
pub fn tensor_seed<I>(values: I) -> u32
where
    I: ExactSizeIterator<Item = f32>,
{
    let stride = (values.len() / SEED_SAMPLES).max(1);
    let mut hash: i32 = 0;
    for value in values.step_by(stride) {
        let quantized = round_half_up((value as f64 + 3.0) * 10000.0) as i64 as i32;
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(quantized);
    }
    hash.unsigned_abs()
}

/// One step of the mulberry32 generator: returns a value in [0, 1) and the next state.
pub fn mulberry32(state: u32) -> (f64, u32) {
    let next = state.wrapping_add(MULBERRY_INCREMENT);
    let mut t = (next ^ (next >> 15)).wrapping_mul(next | 1);
    t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
    let value = (t ^ (t >> 14)) as f64 / 4_294_967_296.0;
    (value, next)
}

/// Logit decays linearly with distance from `center`, plus seeded jitter.
/// The generator advances once per class, in canonical order.
pub fn logits(center: usize, seed: u32) -> [f64; NUM_CLASSES] {
    let mut state = seed;
    let mut out = [0.0f64; NUM_CLASSES];
    for (i, logit) in out.iter_mut().enumerate() {
        let (jitter, next) = mulberry32(state);
        state = next;
        let distance = (i as f64 - center as f64).abs();
        *logit = -distance * DISTANCE_COEFFICIENT + (jitter - 0.5) * JITTER_AMPLITUDE;
    }
    out
}

pub fn softmax(logits: &[f64; NUM_CLASSES]) -> [f64; NUM_CLASSES] {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = logits.map(|logit| (logit - max).exp());
    let sum: f64 = exps.iter().sum();
    exps.map(|e| e / sum)
}
