use serde::Serialize;

/// Water turbidity severity, most turbid first.
///
/// The declaration order is the canonical class order: `index()` of each
/// variant is its position in logit and probability vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurbidityClass {
    UltraCloudy,
    VeryCloudy,
    Cloudy,
    LightlyCloudy,
    LightlyClear,
    Clear,
}

pub const NUM_CLASSES: usize = 6;

/// Expected nephelometric turbidity range for a class, in NTU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NtuRange {
    pub min: f64,
    pub max: f64,
}

impl TurbidityClass {
    pub const ALL: [TurbidityClass; NUM_CLASSES] = [
        TurbidityClass::UltraCloudy,
        TurbidityClass::VeryCloudy,
        TurbidityClass::Cloudy,
        TurbidityClass::LightlyCloudy,
        TurbidityClass::LightlyClear,
        TurbidityClass::Clear,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> &'static str {
        match self {
            TurbidityClass::UltraCloudy => "ultra_cloudy",
            TurbidityClass::VeryCloudy => "very_cloudy",
            TurbidityClass::Cloudy => "cloudy",
            TurbidityClass::LightlyCloudy => "lightly_cloudy",
            TurbidityClass::LightlyClear => "lightly_clear",
            TurbidityClass::Clear => "clear",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TurbidityClass::UltraCloudy => "Ultra Cloudy",
            TurbidityClass::VeryCloudy => "Very Cloudy",
            TurbidityClass::Cloudy => "Cloudy",
            TurbidityClass::LightlyCloudy => "Lightly Cloudy",
            TurbidityClass::LightlyClear => "Lightly Clear",
            TurbidityClass::Clear => "Clear",
        }
    }

    pub fn ntu_range(self) -> NtuRange {
        let (min, max) = match self {
            TurbidityClass::UltraCloudy => (3336.0, 3844.0),
            TurbidityClass::VeryCloudy => (1300.0, 2520.0),
            TurbidityClass::Cloudy => (600.0, 1200.0),
            TurbidityClass::LightlyCloudy => (150.0, 450.0),
            TurbidityClass::LightlyClear => (25.0, 90.0),
            TurbidityClass::Clear => (1.47, 17.13),
        };
        NtuRange { min, max }
    }
}
