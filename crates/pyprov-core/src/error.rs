//! 部署流程的致命错误类型与进程退出码映射。
//!
//! 说明：
//! - 这些错误都会终止本次运行，不做任何重试
//! - “探测不到版本”与“单个卸载条目失败”不属于错误，不在此定义
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::path::PathBuf;

use thiserror::Error;

use crate::version::VersionTriple;

/// 部署流程中的致命错误。
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// 请求的版本不在允许清单中。
    #[error("版本 {requested} 不在允许安装的清单中（允许：{allowed}）")]
    InvalidVersion { requested: String, allowed: String },

    /// 宿主系统版本低于最低要求，或无法确定。
    #[error("不支持的操作系统：Windows 内部版本 {found}，最低要求 {required}")]
    UnsupportedHost { found: String, required: u32 },

    /// 下载未在预期位置产生文件。
    #[error("下载失败: {url} -> {}: {reason}", path.display())]
    Download {
        url: String,
        path: PathBuf,
        reason: String,
    },

    /// 安装程序运行后仍探测不到任何版本。
    #[error("安装 Python {requested} 失败：安装后未探测到任何 Python 版本")]
    InstallationFailed { requested: VersionTriple },

    /// 无法获得管理员权限。
    #[error("无法获得管理员权限: {0}")]
    Elevation(String),

    /// 配置文件或配置项非法。
    #[error("配置错误: {0}")]
    Config(String),
}

impl ProvisionError {
    /// 错误对应的进程退出码（均为非 0）。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidVersion { .. } => 2,
            Self::UnsupportedHost { .. } => 3,
            Self::Download { .. } => 4,
            Self::InstallationFailed { .. } => 5,
            Self::Elevation(_) => 6,
            Self::Config(_) => 7,
        }
    }
}
