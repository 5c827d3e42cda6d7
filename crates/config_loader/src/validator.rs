//! 配置校验模块
//!
//! 校验规则：
//! - 参数范围 (`validator` derive，例如容差 > 0、填充时间 >= 0)
//! - 滤波器阶数为偶数
//! - 制动冲击度车速区间 min < max
//! - FCW 预警等级低于制动等级
//! - KPI 列名唯一且非空
//! - 通道别名非空

use contracts::{AnalysisConfig, ContractError, KpiSchema};
use validator::Validate;

/// 校验 AnalysisConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。标定表形状不在此处校验，
/// 由加载器剔除并告警。
pub fn validate(config: &AnalysisConfig) -> Result<(), ContractError> {
    validate_param_ranges(config)?;
    validate_filter(config)?;
    validate_fcw(config)?;
    validate_kpi_schema(config)?;
    validate_channel_aliases(config)?;
    Ok(())
}

/// 校验字段范围
fn validate_param_ranges(config: &AnalysisConfig) -> Result<(), ContractError> {
    config
        .params
        .validate()
        .map_err(|e| ContractError::config_validation("params", e.to_string().replace('\n', "; ")))
}

/// 校验滤波器阶数 (级联双二阶节)
fn validate_filter(config: &AnalysisConfig) -> Result<(), ContractError> {
    let order = config.params.filter.order;
    if order % 2 != 0 {
        return Err(ContractError::config_validation(
            "filter.order",
            format!("order must be even, got {order}"),
        ));
    }
    Ok(())
}

/// 校验 FCW 参数之间的关系
fn validate_fcw(config: &AnalysisConfig) -> Result<(), ContractError> {
    let fcw = &config.params.fcw;
    if fcw.brakejerk_min_speed >= fcw.brakejerk_max_speed {
        return Err(ContractError::config_validation(
            "fcw.brakejerk_min_speed / fcw.brakejerk_max_speed",
            format!(
                "brakejerk_min_speed ({}) must be < brakejerk_max_speed ({})",
                fcw.brakejerk_min_speed, fcw.brakejerk_max_speed
            ),
        ));
    }
    if fcw.warning_level >= fcw.brake_level {
        return Err(ContractError::config_validation(
            "fcw.warning_level / fcw.brake_level",
            format!(
                "warning_level ({}) must be < brake_level ({})",
                fcw.warning_level, fcw.brake_level
            ),
        ));
    }
    Ok(())
}

/// 校验 KPI 列声明
fn validate_kpi_schema(config: &AnalysisConfig) -> Result<(), ContractError> {
    if config.kpi.is_empty() {
        return Ok(());
    }
    KpiSchema::new(config.kpi.clone()).map(|_| ())
}

/// 校验通道别名
fn validate_channel_aliases(config: &AnalysisConfig) -> Result<(), ContractError> {
    for (logical, raw_names) in &config.channels {
        if logical.trim().is_empty() {
            return Err(ContractError::config_validation(
                "channels",
                "logical channel name cannot be empty",
            ));
        }
        if raw_names.is_empty() || raw_names.iter().any(|n| n.trim().is_empty()) {
            return Err(ContractError::config_validation(
                format!("channels.{logical}"),
                "alias list cannot be empty or contain empty names",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ColumnSpec, ColumnType, Feature};

    #[test]
    fn test_default_config_valid() {
        assert!(validate(&AnalysisConfig::default()).is_ok());
    }

    #[test]
    fn test_range_error_names_field() {
        let mut cfg = AnalysisConfig::default();
        cfg.params.aeb.tgt_tol = 0.0;
        let result = validate(&cfg);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("tgt_tol"), "got: {err}");
    }

    #[test]
    fn test_odd_filter_order() {
        let mut cfg = AnalysisConfig::default();
        cfg.params.filter.order = 3;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("must be even"), "got: {err}");
    }

    #[test]
    fn test_speed_band_inverted() {
        let mut cfg = AnalysisConfig::default();
        cfg.params.fcw.brakejerk_min_speed = 140.0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("brakejerk_min_speed"), "got: {err}");
    }

    #[test]
    fn test_warning_level_above_brake_level() {
        let mut cfg = AnalysisConfig::default();
        cfg.params.fcw.warning_level = 3;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("warning_level"), "got: {err}");
    }

    #[test]
    fn test_duplicate_kpi_column() {
        let mut cfg = AnalysisConfig::default();
        let col = ColumnSpec::new("vehSpd", ColumnType::Double, "kph", Feature::Common);
        cfg.kpi = vec![col.clone(), col];
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_empty_alias_list() {
        let mut cfg = AnalysisConfig::default();
        cfg.channels.insert("egoSpeedKph".into(), vec![]);
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("channels.egoSpeedKph"), "got: {err}");
    }
}
