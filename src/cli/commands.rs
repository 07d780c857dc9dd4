//! # CLI Commands / CLI 命令
//!
//! - `run` - Plan and execute the selected check groups (the default command)
//! - `init` - Write a default check matrix configuration
//!
//! - `run` - 规划并执行所选的检查组（默认命令）
//! - `init` - 写入默认的检查矩阵配置

pub mod init;
pub mod run;
