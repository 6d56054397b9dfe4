// apps/at_cli/src/commands/template.rs

//! 生成默认配置命令

use std::path::PathBuf;

use anyhow::{Context, Result};
use at_config::{RunConfig, StartLocation};
use clap::Args;
use tracing::info;

/// 模板参数
#[derive(Args)]
pub struct TemplateArgs {
    /// 输出文件路径
    #[arg(short, long, default_value = "run.json")]
    pub output: PathBuf,
}

/// 执行模板命令
pub fn execute(args: TemplateArgs) -> Result<()> {
    let config = RunConfig {
        start_locations: vec![StartLocation::new(0.0, 0.0, 500.0)],
        ..Default::default()
    };
    config
        .save_to_file(&args.output)
        .with_context(|| format!("无法写入配置文件: {}", args.output.display()))?;
    info!("默认配置已写入: {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        execute(TemplateArgs { output: path.clone() }).unwrap();
        let config = RunConfig::from_file(&path).unwrap();
        assert_eq!(config.start_locations.len(), 1);
    }
}
