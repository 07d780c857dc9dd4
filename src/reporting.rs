//! # Reporting Module / 报告模块
//!
//! This module renders the result ledger as a deterministic console summary,
//! prints failure details and expanded plans.
//!
//! 此模块将结果台账渲染为确定性的控制台摘要，并打印失败详情和展开后的计划。

pub mod console;

// Re-export common reporting functions
pub use console::{Report, render, write_report};
