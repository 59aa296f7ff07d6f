pub mod classes;
pub mod engine;
pub mod pipeline;
pub mod result;

/// Rounds to the nearest integer, halves towards positive infinity.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
