//! 提权检测与以管理员身份重新启动。
//!
//! 说明：
//! - 未提权时通过 `ShellExecuteW`（verb = `runas`）以相同参数重新启动自身，
//!   当前进程随后退出（交接，而非等待子进程）
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::ffi::OsString;

use anyhow::Result;

/// 提权检查结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// 当前进程已是管理员，可继续执行。
    AlreadyElevated,
    /// 已以管理员身份重新启动，当前进程应直接退出。
    Relaunched,
}

/// 判断当前进程是否以管理员权限运行。
///
/// 返回值：
/// - `Ok(true)`：当前为管理员
/// - `Ok(false)`：当前非管理员（非 Windows 平台恒为 `false`）
///
/// 异常处理：
/// - 该 Win32 API 本身不返回错误码；此处保留 `Result` 以统一上层调用风格。
#[cfg(windows)]
pub fn is_running_as_admin() -> Result<bool> {
    use windows::Win32::UI::Shell::IsUserAnAdmin;

    unsafe { Ok(IsUserAnAdmin().as_bool()) }
}

#[cfg(not(windows))]
pub fn is_running_as_admin() -> Result<bool> {
    Ok(false)
}

/// 确保以管理员权限运行；未提权时以相同参数重新启动。
///
/// 参数：
/// - `args`：原始命令行参数（不含程序名）
///
/// 异常处理：
/// - 重新启动失败（用户拒绝 UAC、平台不支持等）返回错误
pub fn ensure_elevated(args: &[OsString]) -> Result<Elevation> {
    if is_running_as_admin()? {
        return Ok(Elevation::AlreadyElevated);
    }
    relaunch_elevated(args)?;
    Ok(Elevation::Relaunched)
}

/// 以管理员身份重新启动当前可执行文件。
///
/// 安全/内存说明：
/// - 传给 Win32 的宽字符串在调用期间保持存活（局部 `Vec<u16>`）
#[cfg(windows)]
pub fn relaunch_elevated(args: &[OsString]) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    use anyhow::{bail, Context};
    use pyprov_core::cmdline;
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Shell::ShellExecuteW;
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    let exe = std::env::current_exe().context("获取当前可执行文件路径失败")?;
    let params = cmdline::join_args(args.iter().map(|a| a.to_string_lossy().into_owned()));
    tracing::info!("当前非管理员，以管理员身份重新启动: {} {params}", exe.display());

    let verb = to_wide(OsStr::new("runas"));
    let file = to_wide(exe.as_os_str());
    let parameters = to_wide(OsStr::new(&params));
    let result = unsafe {
        ShellExecuteW(
            HWND::default(),
            PCWSTR(verb.as_ptr()),
            PCWSTR(file.as_ptr()),
            PCWSTR(parameters.as_ptr()),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };
    // 返回值不大于 32 表示失败（例如用户取消 UAC 提示）。
    let code = result.0 as isize;
    if code <= 32 {
        bail!("ShellExecuteW(runas) 失败，返回值 {code}");
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn relaunch_elevated(_args: &[OsString]) -> Result<()> {
    anyhow::bail!("当前平台不支持以管理员身份重新启动")
}
