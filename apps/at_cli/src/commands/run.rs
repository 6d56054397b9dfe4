// apps/at_cli/src/commands/run.rs

//! 运行轨迹命令
//!
//! 气象数据的读取不在本工具范围内。本命令按参数构造时空均匀风场，
//! 按配置运行全部起点，并以 JSON 输出轨迹。

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use at_config::RunConfig;
use at_physics::prelude::*;
use clap::Args;
use glam::DVec3;
use serde_json::{json, Value};
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 输出文件（缺省输出到标准输出）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 纬向风 [m/s]
    #[arg(long, default_value = "0.0")]
    pub u: f64,

    /// 经向风 [m/s]
    #[arg(long, default_value = "0.0")]
    pub v: f64,

    /// 垂直速度 [m/s]
    #[arg(long, default_value = "0.0")]
    pub w: f64,

    /// 经度范围下限 [°]
    #[arg(long, default_value = "-30.0", allow_hyphen_values = true)]
    pub lon_min: f64,

    /// 经度范围上限 [°]
    #[arg(long, default_value = "30.0", allow_hyphen_values = true)]
    pub lon_max: f64,

    /// 纬度范围下限 [°]
    #[arg(long, default_value = "-30.0", allow_hyphen_values = true)]
    pub lat_min: f64,

    /// 纬度范围上限 [°]
    #[arg(long, default_value = "30.0", allow_hyphen_values = true)]
    pub lat_max: f64,

    /// 水平分辨率 [°]
    #[arg(long, default_value = "1.0")]
    pub resolution: f64,

    /// 垂直层间距 [m]
    #[arg(long, default_value = "500.0")]
    pub level_step: f64,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== AtmoTrace 轨迹计算 ===");

    let config = RunConfig::from_file(&args.config)
        .with_context(|| format!("无法加载配置文件: {}", args.config.display()))?;
    if config.start_locations.is_empty() {
        warn!("配置中没有起点");
    }

    let field = build_field(&args, &config)?;
    let (nt, nz, ny, nx) = field.shape();
    info!("均匀风场: {}×{}×{}×{} 节点, 风速=({}, {}, {}) m/s", nt, nz, ny, nx, args.u, args.v, args.w);

    let engine = TrajectoryEngine::new(&field, &config).context("构建轨迹引擎失败")?;

    let start = Instant::now();
    let results = engine.run_configured();
    info!("计算时间: {:.3} s", start.elapsed().as_secs_f64());

    let report: Vec<Value> = results
        .iter()
        .enumerate()
        .map(|(i, result)| match result {
            Ok(traj) => json!(traj),
            Err(e) => json!({ "source_index": i, "error": e.to_string() }),
        })
        .collect();
    let text = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("无法写入输出文件: {}", path.display()))?;
            info!("结果已写入: {}", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// 覆盖运行时长的均匀风场
fn build_field(args: &RunArgs, config: &RunConfig) -> Result<GriddedField> {
    if !(args.resolution > 0.0 && args.level_step > 0.0) {
        bail!("分辨率与层间距必须为正");
    }
    if !(args.lon_max > args.lon_min && args.lat_max > args.lat_min) {
        bail!("经纬度范围无效");
    }

    let count = |lo: f64, hi: f64, step: f64| ((hi - lo) / step).round() as usize + 1;
    let hours = config.total_run_hours.abs().ceil().max(1.0) as usize;

    let field = GriddedField::uniform(
        Axis::regular("lon", args.lon_min, args.resolution, count(args.lon_min, args.lon_max, args.resolution))?,
        Axis::regular("lat", args.lat_min, args.resolution, count(args.lat_min, args.lat_max, args.resolution))?,
        Axis::regular("level", 0.0, args.level_step, count(0.0, config.model_top, args.level_step))?,
        Axis::regular("time", 0.0, 3600.0, hours + 1)?,
        VerticalCoordinateKind::Height,
        DVec3::new(args.u, args.v, args.w),
    )?;
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use at_config::StartLocation;

    fn args(config: PathBuf, output: Option<PathBuf>) -> RunArgs {
        RunArgs {
            config,
            output,
            u: 10.0,
            v: 0.0,
            w: 0.0,
            lon_min: -10.0,
            lon_max: 10.0,
            lat_min: -10.0,
            lat_max: 10.0,
            resolution: 1.0,
            level_step: 500.0,
        }
    }

    #[test]
    fn test_build_field_covers_run() {
        let config = RunConfig {
            total_run_hours: -5.5,
            ..Default::default()
        };
        let field = build_field(&args(PathBuf::new(), None), &config).unwrap();
        assert_eq!(field.shape(), (7, 21, 21, 21));
        assert_eq!(field.time_axis().last(), 6.0 * 3600.0);
        assert_eq!(field.level_axis().last(), 10_000.0);
    }

    #[test]
    fn test_run_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("run.json");
        let output_path = dir.path().join("out.json");

        let config = RunConfig {
            total_run_hours: 1.0,
            start_locations: vec![StartLocation::new(0.0, 0.0, 500.0), StartLocation::new(0.0, 0.0, 20_000.0)],
            ..Default::default()
        };
        config.save_to_file(&config_path).unwrap();

        execute(args(config_path, Some(output_path.clone()))).unwrap();

        let text = std::fs::read_to_string(&output_path).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["status"], "completed_normally");
        assert!(value[1]["error"].is_string());
    }
}
