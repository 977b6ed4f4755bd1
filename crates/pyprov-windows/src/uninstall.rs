//! 卸载清扫：逐个静默卸载显示名匹配的已安装条目。
//!
//! 说明：
//! - 顺序执行、逐个阻塞等待，不并行
//! - 单个条目失败只记录日志，继续处理其余条目（尽力而为，非事务）
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use anyhow::Result;
use pyprov_core::uninstall::{RemovalCommand, SweepReport, UninstallEntry, UninstallFilter};
use tracing::{info, warn};

use crate::{process, registry};

/// 视为成功的退出码：0 成功，3010 成功但需要重启，1641 成功并已触发重启。
pub const SUCCESS_EXIT_CODES: [i32; 3] = [0, 3010, 1641];

/// 从注册表枚举并清扫所有匹配条目。
pub fn sweep(filter: &UninstallFilter) -> SweepReport {
    let entries = registry::uninstall_entries();
    sweep_entries(&entries, filter, |cmd| process::run_and_wait(&cmd.program, &cmd.args))
}

/// 对给定条目执行清扫；`run` 负责执行单条卸载命令并返回退出码。
pub fn sweep_entries<F>(entries: &[UninstallEntry], filter: &UninstallFilter, mut run: F) -> SweepReport
where
    F: FnMut(&RemovalCommand) -> Result<Option<i32>>,
{
    let mut report = SweepReport::default();
    for entry in entries.iter().filter(|e| filter.matches(e)) {
        report.matched += 1;
        let Some(cmd) = entry.removal_command() else {
            warn!("条目缺少卸载信息，跳过: {} ({})", entry.display_name, entry.key_name);
            continue;
        };
        info!("卸载: {} -> {} {}", entry.display_name, cmd.program, cmd.args.join(" "));
        report.attempted += 1;
        match run(&cmd) {
            Ok(Some(code)) if SUCCESS_EXIT_CODES.contains(&code) => {}
            Ok(code) => {
                report.failed += 1;
                warn!("卸载 {} 退出码异常: {code:?}", entry.display_name);
            }
            Err(e) => {
                report.failed += 1;
                warn!("卸载 {} 失败: {e:#}", entry.display_name);
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, uninstall: Option<&str>) -> UninstallEntry {
        UninstallEntry {
            key_name: name.to_string(),
            display_name: name.to_string(),
            uninstall_string: uninstall.map(str::to_string),
            ..UninstallEntry::default()
        }
    }

    #[test]
    fn failures_do_not_stop_the_sweep() {
        let filter = UninstallFilter::new(r"^Python \d+\.\d+\.\d+").unwrap();
        let entries = vec![
            entry("Python 3.9.13 (64-bit)", Some("a.exe")),
            entry("Python Launcher", Some("launcher.exe")),
            entry("Python 3.10.11 (64-bit)", Some("b.exe")),
            entry("Python 3.10.11 Tcl/Tk Support (64-bit)", None),
            entry("Python 3.12.9 (64-bit)", Some("c.exe")),
        ];
        let mut ran = Vec::new();
        let report = sweep_entries(&entries, &filter, |cmd| {
            ran.push(cmd.program.clone());
            match cmd.program.as_str() {
                "a.exe" => Err(anyhow::anyhow!("spawn failed")),
                "b.exe" => Ok(Some(1603)),
                _ => Ok(Some(3010)),
            }
        });
        assert_eq!(ran, vec!["a.exe", "b.exe", "c.exe"]);
        assert_eq!(
            report,
            SweepReport {
                matched: 4,
                attempted: 3,
                failed: 2,
            }
        );
    }

    #[test]
    fn nothing_matching_runs_nothing() {
        let filter = UninstallFilter::new(r"^Python \d+").unwrap();
        let entries = vec![entry("Git", Some("git-uninstall.exe"))];
        let report = sweep_entries(&entries, &filter, |_| panic!("must not run"));
        assert_eq!(report, SweepReport::default());
    }
}
