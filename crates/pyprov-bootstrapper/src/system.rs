//! 真实宿主实现：把编排流程需要的能力接到 Windows API、注册表与网络上。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::path::Path;

use anyhow::Result;
use pyprov_core::config::{Architecture, ProbeSettings};
use pyprov_core::provision::HostOps;
use pyprov_core::uninstall::{SweepReport, UninstallFilter};
use pyprov_core::version::VersionTriple;
use pyprov_windows::{host, probe, process, registry, uninstall};
use tracing::{debug, warn};

use crate::download::Downloader;

/// 探测已安装版本。
///
/// 安装程序只修改注册表中的 PATH，因此每次探测都重新读取注册表。
pub fn detect_installed(probe_settings: &ProbeSettings) -> Option<VersionTriple> {
    let search_path = registry::refreshed_search_path().unwrap_or_else(|e| {
        warn!("读取注册表 PATH 失败，使用进程 PATH: {e:#}");
        None
    });
    probe::detect_installed_version(probe_settings, search_path.as_deref())
}

pub struct SystemHost {
    downloader: Downloader,
}

impl SystemHost {
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }
}

impl HostOps for SystemHost {
    fn detect_installed_version(&self, probe_settings: &ProbeSettings) -> Option<VersionTriple> {
        detect_installed(probe_settings)
    }

    fn detect_architecture(&self) -> Architecture {
        host::architecture()
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let written = self.downloader.fetch_to(url, dest)?;
        debug!("已下载 {written} 字节到 {}", dest.display());
        Ok(())
    }

    fn run_installer(&self, program: &Path, args: &[String]) -> Result<Option<i32>> {
        process::run_and_wait(program, args)
    }

    fn uninstall_matching(&self, filter: &UninstallFilter) -> SweepReport {
        uninstall::sweep(filter)
    }
}
