use serde::Serialize;

use crate::ml::classes::{NtuRange, TurbidityClass, NUM_CLASSES};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbability {
    pub class: TurbidityClass,
    pub label: &'static str,
    pub probability: f64,
}

/// Outcome of one classification. `probabilities` is in canonical class
/// order, not sorted by probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub class: TurbidityClass,
    pub label: &'static str,
    pub confidence: f64,
    pub ntu_range: NtuRange,
    pub probabilities: Vec<ClassProbability>,
}

/// Index of the largest probability; the earliest index wins ties.
pub fn argmax(probabilities: &[f64; NUM_CLASSES]) -> usize {
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = i;
        }
    }
    best
}

pub fn build_result(probabilities: &[f64; NUM_CLASSES]) -> PredictionResult {
    let best = argmax(probabilities);
    let class = TurbidityClass::ALL[best];

    let confidence = probabilities[best];
    let entries = TurbidityClass::ALL
        .iter()
        .zip(probabilities.iter())
        .map(|(class, p)| ClassProbability {
            class: *class,
            label: class.label(),
            probability: *p,
        })
        .collect();

    PredictionResult {
        class,
        label: class.label(),
        confidence,
        ntu_range: class.ntu_range(),
        probabilities: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.1, 0.35, 0.35, 0.1, 0.05, 0.05]), 1);
        assert_eq!(argmax(&[0.2, 0.2, 0.2, 0.2, 0.1, 0.1]), 0);
        assert_eq!(argmax(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]), 5);
    }

    #[test]
    fn test_build_result_keeps_canonical_order() {
        let probs = [0.05, 0.1, 0.5, 0.2, 0.1, 0.05];
        let result = build_result(&probs);

        assert_eq!(result.class, TurbidityClass::Cloudy);
        assert_eq!(result.label, "Cloudy");
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.ntu_range, NtuRange { min: 600.0, max: 1200.0 });

        assert_eq!(result.probabilities.len(), NUM_CLASSES);
        for (i, entry) in result.probabilities.iter().enumerate() {
            assert_eq!(entry.class, TurbidityClass::ALL[i]);
            assert_eq!(entry.probability, probs[i]);
        }
    }

    #[test]
    fn test_serialized_shape() {
        let result = build_result(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["class"], "clear");
        assert_eq!(json["label"], "Clear");
        assert_eq!(json["ntu_range"]["min"], 1.47);
        assert_eq!(json["probabilities"][0]["class"], "ultra_cloudy");
        assert_eq!(json["probabilities"][0]["label"], "Ultra Cloudy");
    }
}
