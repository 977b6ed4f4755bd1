//! 注册表读取：已安装程序清单（Uninstall 键）与系统/用户 PATH。
//!
//! 主要用途：
//! - reinstall 时枚举所有已注册的 Python 安装条目
//! - 安装程序只更新注册表中的 PATH，不会更新当前进程环境；复检时需从注册表重新读取
//!
//! 权限要求：
//! - 读取 HKLM/HKCU 下的这些键通常不需要管理员权限
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::ffi::OsString;

use anyhow::Result;
use pyprov_core::uninstall::UninstallEntry;

/// 卸载信息所在的子键（相对 HKLM / HKCU）。
pub const UNINSTALL_KEY: &str = "SOFTWARE\\Microsoft\\Windows\\CurrentVersion\\Uninstall";

/// 64 位系统上 32 位程序的卸载信息（相对 HKLM）。
pub const UNINSTALL_KEY_WOW64: &str = "SOFTWARE\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall";

/// 注册表根键。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryRoot {
    LocalMachine,
    CurrentUser,
}

impl RegistryRoot {
    /// 可读名称（用于日志）。
    pub fn name(self) -> &'static str {
        match self {
            Self::LocalMachine => "HKLM",
            Self::CurrentUser => "HKCU",
        }
    }
}

/// 需要扫描的卸载键（按此顺序清扫）。
pub const UNINSTALL_ROOTS: [(RegistryRoot, &str); 3] = [
    (RegistryRoot::LocalMachine, UNINSTALL_KEY),
    (RegistryRoot::LocalMachine, UNINSTALL_KEY_WOW64),
    (RegistryRoot::CurrentUser, UNINSTALL_KEY),
];

/// 枚举所有卸载键下的条目。
///
/// 异常处理：
/// - 单个根键打不开（例如 32 位系统没有 WOW6432Node）只记录日志并跳过
pub fn uninstall_entries() -> Vec<UninstallEntry> {
    let mut entries = Vec::new();
    for (root, path) in UNINSTALL_ROOTS {
        match read_uninstall_entries(root, path) {
            Ok(found) => entries.extend(found),
            Err(e) => tracing::debug!("读取 {}\\{path} 失败，跳过: {e:#}", root.name()),
        }
    }
    entries
}

/// 读取指定键下全部子键的卸载信息；没有 `DisplayName` 的子键被忽略。
///
/// 异常处理：
/// - 打开根键失败返回错误；单个子键读取失败直接跳过
#[cfg(windows)]
pub fn read_uninstall_entries(root: RegistryRoot, path: &str) -> Result<Vec<UninstallEntry>> {
    use anyhow::Context;

    let key = open_key(root, path).with_context(|| format!("打开注册表键失败: {}\\{path}", root.name()))?;
    let mut entries = Vec::new();
    for name in key.enum_keys().filter_map(|k| k.ok()) {
        let Ok(sub) = key.open_subkey(&name) else {
            continue;
        };
        let Ok(display_name) = sub.get_value::<String, _>("DisplayName") else {
            continue;
        };
        entries.push(UninstallEntry {
            display_name,
            quiet_uninstall_string: sub.get_value::<String, _>("QuietUninstallString").ok(),
            uninstall_string: sub.get_value::<String, _>("UninstallString").ok(),
            windows_installer: sub.get_value::<u32, _>("WindowsInstaller").map_or(false, |v| v == 1),
            key_name: name,
        });
    }
    Ok(entries)
}

#[cfg(not(windows))]
pub fn read_uninstall_entries(root: RegistryRoot, path: &str) -> Result<Vec<UninstallEntry>> {
    anyhow::bail!("当前平台没有注册表: {}\\{path}", root.name())
}

/// HKLM 始终读取 64 位视图，避免 32 位进程被重定向到 WOW6432Node。
#[cfg(windows)]
fn open_key(root: RegistryRoot, path: &str) -> std::io::Result<winreg::RegKey> {
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_64KEY};
    use winreg::RegKey;

    match root {
        RegistryRoot::LocalMachine => {
            RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(path, KEY_READ | KEY_WOW64_64KEY)
        }
        RegistryRoot::CurrentUser => RegKey::predef(HKEY_CURRENT_USER).open_subkey_with_flags(path, KEY_READ),
    }
}

/// 组合“系统 PATH + 用户 PATH + 当前进程 PATH”作为复检用的搜索路径。
///
/// 返回值：
/// - 非 Windows 平台返回 `Ok(None)`（直接使用进程 PATH）
///
/// 异常处理：
/// - 系统 PATH 读取失败返回错误；用户 PATH 不存在视为空
#[cfg(windows)]
pub fn refreshed_search_path() -> Result<Option<OsString>> {
    use anyhow::Context;

    let machine: String = open_key(
        RegistryRoot::LocalMachine,
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment",
    )
    .and_then(|k| k.get_value("Path"))
    .context("读取系统 PATH 失败")?;
    let user: String = open_key(RegistryRoot::CurrentUser, "Environment")
        .and_then(|k| k.get_value("Path"))
        .unwrap_or_default();
    let process = std::env::var("PATH").unwrap_or_default();

    let lookup = |name: &str| std::env::var(name).ok();
    let joined = [machine, user, process]
        .iter()
        .map(|p| expand_env_vars(p, lookup))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(";");
    Ok(Some(OsString::from(joined)))
}

#[cfg(not(windows))]
pub fn refreshed_search_path() -> Result<Option<OsString>> {
    Ok(None)
}

/// 展开 `%NAME%` 形式的环境变量引用；未定义的变量原样保留。
pub fn expand_env_vars<F>(raw: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('%') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name) {
            Some(value) if !name.is_empty() => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            _ => {
                // 未展开时只消费开头的 `%`，结尾的 `%` 可能是下一个变量的开头。
                out.push('%');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
