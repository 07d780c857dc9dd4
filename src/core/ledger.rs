//! # Result Ledger Module / 结果台账模块
//!
//! The ordered record of step outcomes for a single run.
//!
//! 单次运行中步骤结果的有序记录。

use std::collections::HashSet;

use crate::core::error::ConfigError;
use crate::core::models::StepOutcome;

/// Ordered mapping from step name to outcome. Insertion order is execution
/// order and each step name appears at most once.
///
/// 从步骤名称到结果的有序映射。插入顺序即执行顺序，每个步骤名称至多出现一次。
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    outcomes: Vec<StepOutcome>,
    names: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an outcome. Recording the same step twice is a configuration
    /// error: a step executes exactly once per run.
    ///
    /// 追加一个结果。重复记录同一步骤是配置错误：每个步骤在一次运行中恰好执行一次。
    pub fn record(&mut self, outcome: StepOutcome) -> Result<(), ConfigError> {
        if !self.names.insert(outcome.name.clone()) {
            return Err(ConfigError::DuplicateStep { name: outcome.name });
        }
        self.outcomes.push(outcome);
        Ok(())
    }

    /// `true` iff every recorded outcome succeeded. A ledger with no outcomes
    /// has no verdict.
    ///
    /// 当且仅当每个记录的结果都成功时为 `true`。没有任何结果的台账没有裁决。
    pub fn verdict(&self) -> Result<bool, ConfigError> {
        if self.outcomes.is_empty() {
            return Err(ConfigError::EmptyRun);
        }
        Ok(self.outcomes.iter().all(|outcome| outcome.success))
    }

    pub fn get(&self, name: &str) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.success)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
