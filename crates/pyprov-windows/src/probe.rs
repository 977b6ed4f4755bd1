//! 已安装 Python 版本探测：在搜索路径中定位候选命令并解析其版本输出。
//!
//! 约定：
//! - 只使用第一个能找到的候选命令；其输出里找不到版本号即视为未安装
//! - 探测永不失败，任何异常都降级为 `None`
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::ffi::OsStr;
use std::path::PathBuf;

use pyprov_core::config::ProbeSettings;
use pyprov_core::version::VersionTriple;
use tracing::{debug, warn};

use crate::process;

/// 在搜索路径中查找可执行文件。
///
/// 参数：
/// - `search_path`：自定义搜索路径（`;`/`:` 分隔）；为 `None` 时使用进程 `PATH`
pub fn find_executable(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    match search_path {
        Some(paths) => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            which::which_in(name, Some(paths), cwd).ok()
        }
        None => which::which(name).ok(),
    }
}

/// 探测已安装版本。
pub fn detect_installed_version(probe: &ProbeSettings, search_path: Option<&OsStr>) -> Option<VersionTriple> {
    let Some((name, exe)) = probe
        .commands
        .iter()
        .find_map(|name| find_executable(name, search_path).map(|exe| (name, exe)))
    else {
        debug!("候选命令均不在搜索路径中: {:?}", probe.commands);
        return None;
    };

    debug!("使用 `{name}` 探测版本: {}", exe.display());
    let output = match process::capture_output(&exe, &[probe.version_flag.as_str()]) {
        Ok(output) => output,
        Err(e) => {
            warn!("执行 `{name} {}` 失败: {e:#}", probe.version_flag);
            return None;
        }
    };
    let version = VersionTriple::find_in(&output);
    if version.is_none() {
        debug!("`{name}` 的输出中没有版本号: {:?}", output.trim());
    }
    version
}
