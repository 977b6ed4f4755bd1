//! 版本策略：允许清单校验与安装决策。
//!
//! 决策规则（按顺序）：
//! 1) `reinstall = true` 时，已安装版本一律视为“无”（卸载由编排层在决策前完成）
//! 2) 按三段数值比较请求版本与已安装版本；无已安装版本时视为“请求版本更高”
//! 3) 请求版本不高于已安装版本（相等或更低）：`SkipUpToDate`
//! 4) 更高且无已安装版本：`Install`
//! 5) 更高且已安装、允许升级：`Upgrade`
//! 6) 更高且已安装、禁止升级：`SkipUpgradeDisabled`
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::fmt;

use crate::error::ProvisionError;
use crate::version::VersionTriple;

/// 编译进程序的允许安装版本（升序）。
pub const SUPPORTED_VERSIONS: &[&str] = &["3.8.10", "3.9.13", "3.10.11", "3.11.9", "3.12.9", "3.13.2"];

/// 未指定版本时的默认请求版本。
pub const DEFAULT_VERSION: &str = "3.12.9";

/// 允许安装的版本清单。
#[derive(Debug, Clone)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// 程序内置的允许清单。
    pub fn builtin() -> Self {
        Self::new(SUPPORTED_VERSIONS.iter().copied())
    }

    pub fn contains(&self, version: &str) -> bool {
        let version = version.trim();
        self.entries.iter().any(|e| e == version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// 校验请求版本并解析为 [`VersionTriple`]。
    ///
    /// 异常处理：
    /// - 不在清单中（按去除首尾空白后的字符串精确匹配）返回 `InvalidVersion`
    /// - 清单条目本身无法解析同样返回 `InvalidVersion`
    pub fn validate(&self, requested: &str) -> Result<VersionTriple, ProvisionError> {
        let invalid = || ProvisionError::InvalidVersion {
            requested: requested.to_string(),
            allowed: self.to_string(),
        };
        if !self.contains(requested) {
            return Err(invalid());
        }
        requested.trim().parse().map_err(|_| invalid())
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entries.join(", "))
    }
}

/// 策略评估结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 未安装，执行全新安装。
    Install,
    /// 已安装旧版本且允许升级，覆盖安装新版本。
    Upgrade,
    /// 已安装版本不低于请求版本。
    SkipUpToDate,
    /// 有更新版本可用但禁止升级（成功终态，需要管理员介入）。
    SkipUpgradeDisabled,
}

impl Decision {
    /// `Install` 与 `Upgrade` 走同一条“下载 + 安装”路径。
    pub fn requires_installation(self) -> bool {
        matches!(self, Self::Install | Self::Upgrade)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::SkipUpToDate => "skip (up to date)",
            Self::SkipUpgradeDisabled => "skip (upgrade disabled)",
        };
        f.write_str(s)
    }
}

/// 纯函数：根据已安装版本、请求版本与开关计算决策。
pub fn evaluate(
    installed: Option<VersionTriple>,
    requested: VersionTriple,
    upgrade: bool,
    reinstall: bool,
) -> Decision {
    let installed = if reinstall { None } else { installed };
    match installed {
        None => Decision::Install,
        Some(current) if requested <= current => Decision::SkipUpToDate,
        Some(_) if upgrade => Decision::Upgrade,
        Some(_) => Decision::SkipUpgradeDisabled,
    }
}

/// 是否需要在决策前执行卸载清扫（仅 reinstall 且探测到已安装版本时）。
pub fn needs_uninstall_sweep(installed: Option<VersionTriple>, reinstall: bool) -> bool {
    reinstall && installed.is_some()
}
