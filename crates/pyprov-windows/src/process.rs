//! 外部进程执行（阻塞等待，无超时）。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::ffi::OsStr;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// 运行命令并返回合并后的 stdout + stderr 文本。
///
/// 说明：
/// - 部分程序（例如 Python 2）把版本信息写到 stderr，因此两者都收集
/// - 不检查退出码，调用方只关心输出内容
///
/// 异常处理：
/// - 进程启动失败返回错误
pub fn capture_output<P, S>(program: P, args: &[S]) -> Result<String>
where
    P: AsRef<OsStr>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let out = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("启动进程失败: {}", program.to_string_lossy()))?;
    let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&out.stderr));
    Ok(text)
}

/// 运行命令并阻塞等待其退出。
///
/// 返回值：
/// - 进程退出码；被信号终止等无退出码的情况返回 `None`
///
/// 异常处理：
/// - 进程启动失败返回错误（常见原因：文件不存在、权限不足）
pub fn run_and_wait<P, S>(program: P, args: &[S]) -> Result<Option<i32>>
where
    P: AsRef<OsStr>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .status()
        .with_context(|| format!("启动进程失败: {}", program.to_string_lossy()))?;
    Ok(status.code())
}
