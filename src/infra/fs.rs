//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations, such as
//! discovering example directories and cleaning up the transient log files
//! a run creates.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如发现示例目录以及清理运行过程中创建的临时日志文件。

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Checks if a path exists and is a directory.
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a directory, `false` otherwise
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Lists the immediate sub-directories of `root/dir`, sorted by name, as
/// `dir/<name>` strings. Hidden directories are skipped.
///
/// 列出 `root/dir` 的直接子目录，按名称排序，以 `dir/<name>` 字符串形式返回。
/// 隐藏目录会被跳过。
pub fn list_subdirs(root: &Path, dir: &str) -> io::Result<Vec<String>> {
    let base = root.join(dir);
    if !is_directory(&base) {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", base.display()),
        ));
    }

    let mut names: Vec<String> = fs::read_dir(&base)?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    let prefix = dir.trim_end_matches('/');
    Ok(names
        .into_iter()
        .map(|name| format!("{prefix}/{name}"))
        .collect())
}

/// Returns the last `count` lines of a text file, lossily decoded.
/// 返回文本文件的最后 `count` 行（有损解码）。
pub fn tail_lines(path: &Path, count: usize) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    Ok(lines[start..].iter().map(|line| line.to_string()).collect())
}

/// Files a run may create and must not leave behind.
///
/// Every registered path is removed when the guard is dropped, whichever way
/// the run ends. Files that were never created are ignored.
///
/// 一次运行可能创建且不得遗留的文件。
///
/// 无论运行以何种方式结束，守卫被丢弃时都会删除每个已注册的路径。
/// 从未创建的文件会被忽略。
#[derive(Debug, Default)]
pub struct TransientFiles {
    paths: Vec<PathBuf>,
}

impl TransientFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Removes every registered file that exists, returning the paths that
    /// could not be removed. The guard is empty afterwards.
    ///
    /// 删除每个存在的已注册文件，返回无法删除的路径。之后守卫为空。
    pub fn cleanup(&mut self) -> Vec<(PathBuf, io::Error)> {
        let mut failures = Vec::new();
        for path in self.paths.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => failures.push((path, e)),
            }
        }
        failures
    }
}

impl Drop for TransientFiles {
    fn drop(&mut self) {
        for (path, e) in self.cleanup() {
            eprintln!("Failed to remove log file {}: {}", path.display(), e);
        }
    }
}
