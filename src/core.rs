//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Workspace Checker:
//! configuration, data models, matrix expansion, step execution, the result
//! ledger and the run orchestrator.
//!
//! 此模块包含 Workspace Checker 的核心功能：
//! 配置、数据模型、矩阵展开、步骤执行、结果台账和运行编排器。

pub mod config;
pub mod error;
pub mod execution;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod planner;

// Re-exports
pub use config::{CheckConfig, GroupSelection};
pub use error::{ConfigError, ReportError, RunError};
pub use ledger::Ledger;
pub use orchestrator::{Orchestrator, RunPhase, RunSummary};
