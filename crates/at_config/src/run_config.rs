// crates/at_config/src/run_config.rs

//! RunConfig - 轨迹运行配置
//!
//! 一次运行的全部参数，使用 JSON 存取。`total_run_hours` 的符号决定
//! 积分方向：正值为前向轨迹，负值为后向轨迹。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::motion::VerticalMotionConfig;
use crate::turbulence::TurbulenceConfig;

/// 轨迹起点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLocation {
    /// 经度 [°]
    pub lon: f64,
    /// 纬度 [°]
    pub lat: f64,
    /// 垂直坐标（单位由气象场垂直坐标类型决定）
    pub z: f64,
    /// 起始时刻 [s]；缺省时前向取时间轴首个时刻，后向取末个时刻
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
}

impl StartLocation {
    /// 创建起点（起始时刻取缺省值）
    pub fn new(lon: f64, lat: f64, z: f64) -> Self {
        Self {
            lon,
            lat,
            z,
            start_time: None,
        }
    }

    /// 指定起始时刻
    pub fn at_time(mut self, time: f64) -> Self {
        self.start_time = Some(time);
        self
    }
}

/// 积分格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationScheme {
    /// Heun 预估-校正（二阶）
    #[default]
    Heun,
    /// 前向 Euler（一阶）
    Euler,
}

/// 多起点执行策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// 逐条串行
    #[default]
    Sequential,
    /// 线程池并行（按起点划分）
    Parallel,
    /// 结构化数组批量推进
    Batch,
    /// 根据起点数量自动选择
    Auto,
}

/// 质量衰减配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassConfig {
    /// 初始质量（任意单位）
    #[serde(default = "default_initial_mass")]
    pub initial_mass: f64,

    /// 半衰期 [h]；缺省时不衰减
    #[serde(default)]
    pub half_life_hours: Option<f64>,

    /// 质量耗尽阈值（占初始质量的比例）
    #[serde(default = "default_depletion_threshold")]
    pub depletion_threshold: f64,
}

fn default_initial_mass() -> f64 { 1.0 }
fn default_depletion_threshold() -> f64 { 1e-6 }

impl Default for MassConfig {
    fn default() -> Self {
        Self {
            initial_mass: default_initial_mass(),
            half_life_hours: None,
            depletion_threshold: default_depletion_threshold(),
        }
    }
}

/// 运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// 总运行时长 [h]，带符号（负值为后向）
    #[serde(default = "default_total_run_hours")]
    pub total_run_hours: f64,

    /// 输出间隔 [h]
    #[serde(default = "default_output_interval_hours")]
    pub output_interval_hours: f64,

    /// 最大时间步长 [s]
    #[serde(default = "default_dt_max_seconds")]
    pub dt_max_seconds: f64,

    /// CFL 安全系数
    #[serde(default = "default_cfl_ratio")]
    pub cfl_ratio: f64,

    /// 静风下限 ε [单位/s]
    #[serde(default = "default_calm_wind_floor")]
    pub calm_wind_floor: f64,

    /// 最大轨迹年龄 [h]
    #[serde(default)]
    pub max_age_hours: Option<f64>,

    /// 模式顶 [m]
    #[serde(default = "default_model_top")]
    pub model_top: f64,

    /// 缺省地形高度 [m]
    #[serde(default)]
    pub terrain_height: f64,

    /// 积分格式
    #[serde(default)]
    pub integration: IntegrationScheme,

    /// 垂直运动模式
    #[serde(default)]
    pub vertical_motion: VerticalMotionConfig,

    /// 湍流参数
    #[serde(default)]
    pub turbulence: TurbulenceConfig,

    /// 质量衰减
    #[serde(default)]
    pub mass: MassConfig,

    /// 执行策略
    #[serde(default)]
    pub execution: ExecutionMode,

    /// 起点列表
    #[serde(default)]
    pub start_locations: Vec<StartLocation>,
}

fn default_total_run_hours() -> f64 { 24.0 }
fn default_output_interval_hours() -> f64 { 1.0 }
fn default_dt_max_seconds() -> f64 { 3600.0 }
fn default_cfl_ratio() -> f64 { 0.75 }
fn default_calm_wind_floor() -> f64 { 1e-3 }
fn default_model_top() -> f64 { 10_000.0 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_run_hours: default_total_run_hours(),
            output_interval_hours: default_output_interval_hours(),
            dt_max_seconds: default_dt_max_seconds(),
            cfl_ratio: default_cfl_ratio(),
            calm_wind_floor: default_calm_wind_floor(),
            max_age_hours: None,
            model_top: default_model_top(),
            terrain_height: 0.0,
            integration: IntegrationScheme::default(),
            vertical_motion: VerticalMotionConfig::default(),
            turbulence: TurbulenceConfig::default(),
            mass: MassConfig::default(),
            execution: ExecutionMode::default(),
            start_locations: Vec::new(),
        }
    }
}

impl RunConfig {
    /// 积分方向：前向 +1，后向 -1
    pub fn direction(&self) -> f64 {
        if self.total_run_hours < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// 总运行时长 [s]（带符号）
    pub fn total_run_seconds(&self) -> f64 {
        self.total_run_hours * 3600.0
    }

    /// 输出间隔 [s]
    pub fn output_interval_seconds(&self) -> f64 {
        self.output_interval_hours * 3600.0
    }

    /// 最大年龄 [s]
    pub fn max_age_seconds(&self) -> Option<f64> {
        self.max_age_hours.map(|h| h * 3600.0)
    }

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.total_run_hours.is_finite() || self.total_run_hours == 0.0 {
            return Err(ConfigError::invalid(
                "total_run_hours",
                self.total_run_hours,
                "运行时长必须为非零有限值",
            ));
        }

        if !(self.output_interval_hours > 0.0 && self.output_interval_hours.is_finite()) {
            return Err(ConfigError::invalid(
                "output_interval_hours",
                self.output_interval_hours,
                "输出间隔必须为正",
            ));
        }

        if !(self.dt_max_seconds > 0.0 && self.dt_max_seconds.is_finite()) {
            return Err(ConfigError::invalid(
                "dt_max_seconds",
                self.dt_max_seconds,
                "最大时间步长必须为正",
            ));
        }

        if !(self.cfl_ratio > 0.0 && self.cfl_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                "cfl_ratio",
                self.cfl_ratio,
                "CFL 系数必须在 (0, 1] 范围内",
            ));
        }

        if !(self.calm_wind_floor > 0.0 && self.calm_wind_floor.is_finite()) {
            return Err(ConfigError::invalid(
                "calm_wind_floor",
                self.calm_wind_floor,
                "静风下限必须为正",
            ));
        }

        if let Some(age) = self.max_age_hours {
            if age.is_nan() || age <= 0.0 {
                return Err(ConfigError::invalid("max_age_hours", age, "最大年龄必须为正"));
            }
        }

        if !self.terrain_height.is_finite() || self.model_top.is_nan() || self.model_top <= self.terrain_height {
            return Err(ConfigError::invalid(
                "model_top",
                self.model_top,
                format!("模式顶必须高于地形高度 {}", self.terrain_height),
            ));
        }

        self.vertical_motion.validate()?;
        self.turbulence.validate()?;
        self.validate_mass()?;

        Ok(())
    }

    /// 逐个检查起点坐标，返回每个无效起点对应的错误
    ///
    /// 无效起点不会使整个配置失效，运行时由引擎单独报告。
    pub fn start_location_issues(&self) -> Vec<ConfigError> {
        self.start_locations
            .iter()
            .enumerate()
            .filter_map(|(i, loc)| Self::check_start(i, loc).err())
            .collect()
    }

    fn check_start(i: usize, loc: &StartLocation) -> Result<(), ConfigError> {
        if !loc.lon.is_finite() || !loc.lat.is_finite() || !loc.z.is_finite() {
            return Err(ConfigError::invalid(
                format!("start_locations[{}]", i),
                format!("({}, {}, {})", loc.lon, loc.lat, loc.z),
                "起点坐标必须为有限值",
            ));
        }
        if !(-90.0..=90.0).contains(&loc.lat) {
            return Err(ConfigError::invalid(
                format!("start_locations[{}].lat", i),
                loc.lat,
                "纬度必须在 [-90, 90] 范围内",
            ));
        }
        if let Some(t) = loc.start_time {
            if !t.is_finite() {
                return Err(ConfigError::invalid(
                    format!("start_locations[{}].start_time", i),
                    t,
                    "起始时刻必须为有限值",
                ));
            }
        }
        Ok(())
    }

    fn validate_mass(&self) -> Result<(), ConfigError> {
        let mass = &self.mass;
        if !(mass.initial_mass > 0.0 && mass.initial_mass.is_finite()) {
            return Err(ConfigError::invalid(
                "mass.initial_mass",
                mass.initial_mass,
                "初始质量必须为正",
            ));
        }
        if let Some(half_life) = mass.half_life_hours {
            if half_life.is_nan() || half_life <= 0.0 {
                return Err(ConfigError::invalid(
                    "mass.half_life_hours",
                    half_life,
                    "半衰期必须为正",
                ));
            }
        }
        if !(0.0..1.0).contains(&mass.depletion_threshold) {
            return Err(ConfigError::invalid(
                "mass.depletion_threshold",
                mass.depletion_threshold,
                "耗尽阈值必须在 [0, 1) 范围内",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.direction(), 1.0);
        assert_eq!(config.integration, IntegrationScheme::Heun);
        assert_eq!(config.execution, ExecutionMode::Sequential);
    }

    #[test]
    fn test_backward_direction() {
        let config = RunConfig {
            total_run_hours: -6.0,
            ..Default::default()
        };
        assert_eq!(config.direction(), -1.0);
        assert_eq!(config.total_run_seconds(), -21600.0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = RunConfig {
            total_run_hours: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cfl() {
        let mut config = RunConfig::default();
        config.cfl_ratio = 1.5;
        assert!(config.validate().is_err());
        config.cfl_ratio = 0.0;
        assert!(config.validate().is_err());
        config.cfl_ratio = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_top_below_terrain() {
        let config = RunConfig {
            model_top: 100.0,
            terrain_height: 200.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model_top"));
    }

    #[test]
    fn test_invalid_start_latitude() {
        let config = RunConfig {
            start_locations: vec![
                StartLocation::new(0.0, 0.0, 500.0),
                StartLocation::new(0.0, 91.0, 500.0),
                StartLocation::new(f64::NAN, 0.0, 500.0),
            ],
            ..Default::default()
        };
        // 单个无效起点不拒绝整个配置
        assert!(config.validate().is_ok());

        let issues = config.start_location_issues();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].to_string().contains("start_locations[1].lat"));
        assert!(issues[1].to_string().contains("start_locations[2]"));
    }

    #[test]
    fn test_minimal_json() {
        let json = r#"{
            "total_run_hours": -12,
            "vertical_motion": {"mode": "isobaric"},
            "turbulence": {"enabled": true, "seed": 42},
            "start_locations": [{"lon": 116.4, "lat": 39.9, "z": 500.0}]
        }"#;
        let config = RunConfig::from_json(json).unwrap();
        assert_eq!(config.direction(), -1.0);
        assert_eq!(config.vertical_motion, VerticalMotionConfig::Isobaric);
        assert!(config.turbulence.enabled);
        assert_eq!(config.turbulence.seed, 42);
        assert_eq!(config.start_locations.len(), 1);
        assert!(config.start_locations[0].start_time.is_none());
        assert_eq!(config.cfl_ratio, 0.75);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RunConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let config = RunConfig {
            total_run_hours: 48.0,
            max_age_hours: Some(36.0),
            start_locations: vec![StartLocation::new(-80.0, 35.0, 1500.0).at_time(3600.0)],
            ..Default::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = RunConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_mass() {
        let mut config = RunConfig::default();
        config.mass.half_life_hours = Some(-1.0);
        assert!(config.validate().is_err());
        config.mass.half_life_hours = Some(10.0);
        config.mass.depletion_threshold = 1.0;
        assert!(config.validate().is_err());
    }
}
