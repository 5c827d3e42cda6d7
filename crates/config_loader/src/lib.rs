//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON analysis configuration files
//! - Validate parameter ranges and cross-field rules
//! - Drop malformed calibration tables, normalize calibration units once
//! - Generate `AnalysisConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("analysis.toml")).unwrap();
//! println!("PB target: {}", config.params.aeb.pb_tgt_decel);
//! ```

mod parser;
mod validator;

pub use contracts::AnalysisConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::{info, warn};

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<AnalysisConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AnalysisConfig, ContractError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize AnalysisConfig to TOML string
    pub fn to_toml(config: &AnalysisConfig) -> Result<String, ContractError> {
        toml::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize AnalysisConfig to JSON string
    pub fn to_json(config: &AnalysisConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<AnalysisConfig, ContractError> {
        let mut config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Self::prepare_calibrations(&mut config);
        Ok(config)
    }

    /// Remove unusable calibration tables and apply unit normalization
    ///
    /// A dropped table behaves like a missing one: its threshold is NaN.
    fn prepare_calibrations(config: &mut AnalysisConfig) {
        let malformed: Vec<(String, String)> = config
            .calibration
            .iter()
            .filter_map(|(key, table)| table.validate(key).err().map(|e| (key.clone(), e.to_string())))
            .collect();
        for (key, error) in malformed {
            warn!(calibratable = %key, %error, "malformed calibration table dropped");
            config.calibration.remove(&key);
        }

        for scaled in config.calibration.normalize_units() {
            info!(calibratable = %scaled, "calibration values scaled from fraction to percent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Calibratable;
    use std::io::Write;

    const ANALYSIS_TOML: &str = r#"
round_decimals = 3

[segmentation]
fcw_merge_window = 2.0

[aeb]
pb_tgt_decel = -6.0
fb_tgt_decel = -15.0
tgt_tol = 0.2

[fcw]
ttc_max = 10.0

[calibration.SteeringWheelAngle_Th]
x = [0.0, 50.0, 100.0]
y = [5.0, 10.0, 20.0]

[calibration.PedalPosProIncrease_Th]
x = [0.0, 100.0]
y = [0.2, 0.4]

[calibration.YawrateSuspension_Th]
x = [0.0, 50.0, 100.0]
y = [1.0, 2.0]
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(ANALYSIS_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let cfg = result.unwrap();
        assert_eq!(cfg.params.aeb.fb_tgt_decel, -15.0);
        assert!(cfg.calibration.get(Calibratable::SteeringAngle).is_some());
    }

    #[test]
    fn test_malformed_calibration_dropped() {
        let cfg = ConfigLoader::load_from_str(ANALYSIS_TOML, ConfigFormat::Toml).unwrap();
        assert!(cfg.calibration.get(Calibratable::YawRateSuspension).is_none());
        assert_eq!(cfg.calibration.len(), 2);
    }

    #[test]
    fn test_pedal_increase_scaled_once() {
        let cfg = ConfigLoader::load_from_str(ANALYSIS_TOML, ConfigFormat::Toml).unwrap();
        let table = cfg.calibration.get(Calibratable::PedalIncrease).unwrap();
        assert_eq!(table.y, vec![20.0, 40.0]);

        let mut again = cfg.clone();
        again.calibration.normalize_units();
        assert_eq!(
            again.calibration.get(Calibratable::PedalIncrease).unwrap().y,
            vec![20.0, 40.0]
        );
    }

    #[test]
    fn test_round_trip_json() {
        let cfg = ConfigLoader::load_from_str(ANALYSIS_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&cfg).unwrap();
        let cfg2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(cfg.params, cfg2.params);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = "[aeb]\ntgt_tol = -1.0\n";
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ContractError::ConfigValidation { .. }
        ));
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(ANALYSIS_TOML.as_bytes()).unwrap();
        let cfg = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(cfg.params.round_decimals, 3);

        let yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(yaml.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
