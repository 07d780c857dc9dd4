//! # Workspace Checker Library / Workspace Checker 库
//!
//! This library provides the core functionality for the Workspace Checker
//! tool, which drives a matrix of build, test and lint checks across a
//! multi-feature, multi-target workspace and its example projects, then
//! reports a single pass/fail verdict.
//!
//! 此库为 Workspace Checker 工具提供核心功能，
//! 它在多特性、多目标的工作区及其示例项目上驱动构建、测试和 lint 检查矩阵，
//! 然后报告单一的通过/失败裁决。
//!
//! ## Modules / 模块
//!
//! - `core` - Configuration, data models, matrix expansion and the run orchestrator
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Deterministic summary rendering
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 配置、数据模型、矩阵展开和运行编排器
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 确定性的摘要渲染
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::models;
pub use crate::core::planner;

/// Initializes the application's internationalization (i18n).
///
/// Uses `requested` when given, otherwise the system locale. The full locale
/// (e.g., "zh-CN") is tried first, then just the language code (e.g., "en"),
/// and finally the default language ("en"). Returns the locale that was set.
pub fn init(requested: Option<String>) -> String {
    let locale = requested
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    let matched = match_locale(&locale);
    rust_i18n::set_locale(&matched);
    matched
}

/// Maps a requested locale onto one the application ships.
/// 将请求的语言区域映射到应用程序提供的某个语言区域。
pub fn match_locale(locale: &str) -> String {
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    if available_locales.contains(&locale) {
        return locale.to_string();
    }
    locale
        .split(['-', '_'])
        .next()
        .and_then(|lang_code| {
            available_locales
                .iter()
                .find(|available| available.split('-').next() == Some(lang_code))
        })
        .map(|found| found.to_string())
        .unwrap_or_else(|| "en".to_string())
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
