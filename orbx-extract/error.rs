#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    InvalidLevelCount(usize),
    InvalidFeatureCount(usize),
    InvalidScaleFactor(f32),
    InvalidThresholds { ini: u8, min: u8 },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::InvalidLevelCount(n) => {
                write!(f, "Invalid pyramid level count: {} (must be >= 1)", n)
            }
            ExtractError::InvalidFeatureCount(n) => {
                write!(f, "Invalid total feature count: {} (must be >= 1)", n)
            }
            ExtractError::InvalidScaleFactor(s) => {
                write!(f, "Invalid scale factor: {} (must be finite and > 1.0)", s)
            }
            ExtractError::InvalidThresholds { ini, min } => {
                write!(
                    f,
                    "Invalid segment-test thresholds: ini={} min={} (need 1 <= min <= ini <= 127)",
                    ini, min
                )
            }
        }
    }
}

impl std::error::Error for ExtractError {}

pub type ExtractResult<T> = Result<T, ExtractError>;
