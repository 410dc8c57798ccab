use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Vehicle has no stages")]
    EmptyStageList,

    #[error("Stage `{stage}` has invalid {field}: {value}")]
    InvalidStage {
        stage: String,
        field: &'static str,
        value: f64,
    },

    #[error("Pitch schedule thresholds must be strictly increasing (entry {index} at {threshold} s)")]
    PitchScheduleError { index: usize, threshold: f64 },

    #[error("Reference trace error: {0}")]
    ReferenceError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    ScenarioParseError(#[from] toml::de::Error),

    #[error("Failed to parse reference trace: {0}")]
    TraceParseError(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    ExportError(#[from] csv::Error),
}
