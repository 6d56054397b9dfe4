// apps/at_cli/src/commands/mod.rs

//! CLI 子命令

pub mod run;
pub mod template;
pub mod validate;
