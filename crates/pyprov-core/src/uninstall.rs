//! 已安装程序（卸载条目）模型与卸载命令推导。
//!
//! 说明：
//! - 条目来自注册表 `...\CurrentVersion\Uninstall` 下的子键，由平台层读取
//! - 本模块只做匹配与命令推导，不执行任何进程
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use regex::Regex;

use crate::cmdline;
use crate::error::ProvisionError;

/// 注册表中的单个卸载条目。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallEntry {
    /// 子键名（MSI 产品为 `{GUID}` 形式的产品代码）。
    pub key_name: String,
    pub display_name: String,
    pub quiet_uninstall_string: Option<String>,
    pub uninstall_string: Option<String>,
    /// `WindowsInstaller = 1`，即由 MSI 注册。
    pub windows_installer: bool,
}

/// 一条待执行的卸载命令。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl UninstallEntry {
    /// 推导静默卸载命令。
    ///
    /// 优先级：
    /// 1) MSI 产品：`msiexec.exe /x {GUID} /qn /norestart`
    /// 2) `QuietUninstallString` 原样拆分
    /// 3) `UninstallString` 拆分后追加 `/quiet`
    ///
    /// 返回值：
    /// - 无可用卸载信息时返回 `None`
    pub fn removal_command(&self) -> Option<RemovalCommand> {
        if self.windows_installer && is_product_code(&self.key_name) {
            return Some(RemovalCommand {
                program: "msiexec.exe".to_string(),
                args: vec![
                    "/x".to_string(),
                    self.key_name.clone(),
                    "/qn".to_string(),
                    "/norestart".to_string(),
                ],
            });
        }
        if let Some(cmd) = self.quiet_uninstall_string.as_deref().and_then(split_command) {
            return Some(cmd);
        }
        let mut cmd = self.uninstall_string.as_deref().and_then(split_command)?;
        cmd.args.push("/quiet".to_string());
        Some(cmd)
    }
}

fn split_command(line: &str) -> Option<RemovalCommand> {
    let mut parts = cmdline::split_command_line(line).into_iter();
    let program = parts.next()?;
    Some(RemovalCommand {
        program,
        args: parts.collect(),
    })
}

/// `{8-4-4-4-12}` 形式的 MSI 产品代码。
fn is_product_code(key: &str) -> bool {
    let Some(inner) = key.strip_prefix('{').and_then(|k| k.strip_suffix('}')) else {
        return false;
    };
    let groups: Vec<&str> = inner.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8usize, 4, 4, 4, 12])
            .all(|(g, len)| g.len() == len && g.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// 按显示名匹配需要清扫的条目。
#[derive(Debug, Clone)]
pub struct UninstallFilter {
    pattern: Regex,
}

impl UninstallFilter {
    /// 异常处理：正则非法时返回 `Config` 错误。
    pub fn new(pattern: &str) -> Result<Self, ProvisionError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| ProvisionError::Config(format!("卸载匹配正则非法: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, entry: &UninstallEntry) -> bool {
        self.pattern.is_match(&entry.display_name)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// 一次卸载清扫的统计（仅用于日志，不作为成功/失败判定）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub matched: usize,
    pub attempted: usize,
    pub failed: usize,
}
