//! 统一路径约定（日志文件、下载临时目录）。
//!
//! 日志与下载产物默认都放在当前用户的临时目录下（Windows 为 `%TEMP%`）。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// 日志文件名（位于当前用户临时目录）。
pub const LOG_FILE_NAME: &str = "pyprov-install.log";

/// 默认下载临时目录。
///
/// 返回值：
/// - 当前用户临时目录（Windows：`%TEMP%`）
pub fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

/// 默认日志文件路径。
///
/// 返回值：
/// - `%TEMP%\pyprov-install.log`
pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join(LOG_FILE_NAME)
}

/// 创建下载临时目录（含所有上级目录）。
///
/// 异常处理：
/// - 同名路径已是普通文件、或创建失败时返回错误
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_file() {
        bail!("{} 已存在且不是目录", path.display());
    }
    std::fs::create_dir_all(path).with_context(|| format!("无法创建目录 {}", path.display()))
}

/// 解析配置里的路径：绝对路径原样使用，相对路径拼在 `base`（配置文件所在目录）之后。
///
/// 异常处理：
/// - 空路径返回错误
pub fn resolve_path(base: &Path, raw: &Path) -> Result<PathBuf> {
    if raw.as_os_str().is_empty() {
        bail!("路径不能为空");
    }
    Ok(if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        base.join(raw)
    })
}
