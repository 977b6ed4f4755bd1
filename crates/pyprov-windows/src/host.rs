//! 宿主系统信息：Windows 内部版本号、处理器位宽。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use pyprov_core::config::Architecture;
use sysinfo::System;

/// 当前 Windows 内部版本号（如 19045）；无法确定或非 Windows 时返回 `None`。
#[cfg(windows)]
pub fn windows_build() -> Option<u32> {
    System::kernel_version().and_then(|raw| parse_build_number(&raw))
}

#[cfg(not(windows))]
pub fn windows_build() -> Option<u32> {
    None
}

/// 可读的系统描述（用于 doctor 输出）。
pub fn os_description() -> String {
    System::long_os_version().unwrap_or_else(|| "未知".to_string())
}

/// 从 `19045`、`10.0.19045`、`10.0.19045.3570` 等形式中取出内部版本号。
pub fn parse_build_number(raw: &str) -> Option<u32> {
    let parts: Vec<&str> = raw.trim().split('.').collect();
    let build = if parts.len() >= 3 { parts[2] } else { parts[0] };
    build.trim().parse().ok()
}

/// 宿主处理器位宽。
///
/// Windows 上 32 位进程运行在 64 位系统时，`PROCESSOR_ARCHITECTURE` 为 `x86`，
/// 真实架构在 `PROCESSOR_ARCHITEW6432` 中。
pub fn architecture() -> Architecture {
    let raw = if cfg!(windows) {
        std::env::var("PROCESSOR_ARCHITEW6432")
            .or_else(|_| std::env::var("PROCESSOR_ARCHITECTURE"))
            .ok()
    } else {
        Some(std::env::consts::ARCH.to_string())
    };
    Architecture::from_cpu_arch(raw.as_deref())
}
