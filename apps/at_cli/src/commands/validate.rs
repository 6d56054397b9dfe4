// apps/at_cli/src/commands/validate.rs

//! 配置验证命令

use std::path::PathBuf;

use anyhow::{bail, Result};
use at_config::RunConfig;
use clap::Args;
use tracing::{error, info, warn};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== AtmoTrace 配置验证 ===");
    println!("检查配置文件: {}", args.config.display());

    match RunConfig::from_file(&args.config) {
        Ok(config) => {
            println!("  ✓ 配置有效");
            println!("    方向: {}", if config.direction() > 0.0 { "前向" } else { "后向" });
            println!("    运行时长: {} h", config.total_run_hours.abs());
            println!("    垂直运动: {}", config.vertical_motion.name());
            println!("    湍流: {}", if config.turbulence.enabled { "启用" } else { "关闭" });
            println!("    起点数: {}", config.start_locations.len());
            for issue in config.start_location_issues() {
                warn!("起点无效: {}", issue);
                println!("  ! {}", issue);
            }
            Ok(())
        }
        Err(e) => {
            error!("配置无效: {}", e);
            println!("  ✗ {}", e);
            bail!("配置验证失败")
        }
    }
}
