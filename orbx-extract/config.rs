use crate::error::{ExtractError, ExtractResult};
use orbx_core::{ExtractorConfig, Interpolation};

/// Fail-fast configuration validation; callers construct extractors only
/// from configurations this accepts.
pub fn validate(cfg: &ExtractorConfig) -> ExtractResult<()> {
    if cfg.n_levels == 0 {
        return Err(ExtractError::InvalidLevelCount(cfg.n_levels));
    }
    if cfg.n_features == 0 {
        return Err(ExtractError::InvalidFeatureCount(cfg.n_features));
    }
    if !cfg.scale_factor.is_finite() || cfg.scale_factor <= 1.0 {
        return Err(ExtractError::InvalidScaleFactor(cfg.scale_factor));
    }
    if cfg.min_threshold == 0
        || cfg.ini_threshold > 127
        || cfg.min_threshold > cfg.ini_threshold
    {
        return Err(ExtractError::InvalidThresholds {
            ini: cfg.ini_threshold,
            min: cfg.min_threshold,
        });
    }
    Ok(())
}

/// Fluent API builder for extractor configuration.
pub struct ExtractorBuilder {
    cfg: ExtractorConfig,
}

impl ExtractorBuilder {
    /// Create new builder with default settings
    pub fn new() -> Self {
        Self {
            cfg: ExtractorConfig::default(),
        }
    }

    /// Set total keypoint budget
    pub fn n_features(mut self, n_features: usize) -> Self {
        self.cfg.n_features = n_features;
        self
    }

    /// Set per-level scale growth factor
    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.cfg.scale_factor = scale_factor;
        self
    }

    /// Set pyramid level count
    pub fn levels(mut self, n_levels: usize) -> Self {
        self.cfg.n_levels = n_levels;
        self
    }

    /// Set initial and fallback segment-test thresholds
    pub fn thresholds(mut self, ini: u8, min: u8) -> Self {
        self.cfg.ini_threshold = ini;
        self.cfg.min_threshold = min;
        self
    }

    /// Set pyramid resampling interpolation
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.cfg.interpolation = interpolation;
        self
    }

    /// Enable/disable per-keypoint orientation estimation
    pub fn orientation(mut self, enable: bool) -> Self {
        self.cfg.orientation = enable;
        self
    }

    /// Set number of threads for parallel processing
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.cfg.n_threads = n_threads;
        self
    }

    /// Monocular preset: the classic 500-feature, 8-level schedule.
    pub fn preset_monocular(mut self) -> Self {
        self.cfg.n_features = 500;
        self.cfg.scale_factor = 1.2;
        self.cfg.n_levels = 8;
        self.cfg.ini_threshold = 20;
        self.cfg.min_threshold = 7;
        self.cfg.orientation = true;
        self
    }

    /// Stereo preset: a denser budget so both overlap and mono regions stay
    /// well covered, all cores in play.
    pub fn preset_stereo(mut self) -> Self {
        self.cfg.n_features = 1200;
        self.cfg.scale_factor = 1.2;
        self.cfg.n_levels = 8;
        self.cfg.ini_threshold = 20;
        self.cfg.min_threshold = 7;
        self.cfg.orientation = true;
        self.cfg.n_threads = num_cpus::get();
        self
    }

    /// Low-contrast preset: relaxed thresholds for dim or flat scenes.
    pub fn preset_low_contrast(mut self) -> Self {
        self.cfg.ini_threshold = 12;
        self.cfg.min_threshold = 5;
        self
    }

    /// Validate and return the finished configuration.
    pub fn build(self) -> ExtractResult<ExtractorConfig> {
        validate(&self.cfg)?;
        Ok(self.cfg)
    }
}

impl Default for ExtractorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Save configuration to a JSON file
#[cfg(feature = "serde")]
pub fn save_json<P: AsRef<std::path::Path>>(
    cfg: &ExtractorConfig,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load configuration from a JSON file
#[cfg(feature = "serde")]
pub fn load_json<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<ExtractorConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let cfg: ExtractorConfig = serde_json::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Save configuration to a TOML file
#[cfg(feature = "serde")]
pub fn save_toml<P: AsRef<std::path::Path>>(
    cfg: &ExtractorConfig,
    path: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let toml = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Load configuration from a TOML file
#[cfg(feature = "serde")]
pub fn load_toml<P: AsRef<std::path::Path>>(
    path: P,
) -> Result<ExtractorConfig, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let cfg: ExtractorConfig = toml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}
