//! 部署流程编排：探测 → （可选）卸载清扫 → 决策 → 下载 → 安装 → 复检。
//!
//! 设计约束：
//! - 全程单线程、顺序、阻塞执行，任何一步都不重试
//! - 每次会改变宿主状态的操作（安装/卸载）之后都重新探测，不复用旧结果
//! - 下载产物无论成功与否都会在流程结束时删除
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{Architecture, ProbeSettings, ProvisionConfig};
use crate::error::ProvisionError;
use crate::paths;
use crate::policy::{self, Decision};
use crate::uninstall::{SweepReport, UninstallFilter};
use crate::version::VersionTriple;

/// 宿主能力抽象（探测、下载、执行安装程序、卸载清扫）。
///
/// 实现方负责具体 IO；编排逻辑只依赖该 trait，便于用假实现测试。
pub trait HostOps {
    /// 探测已安装版本；探测不到（含输出无法解析）返回 `None`，不得报错。
    fn detect_installed_version(&self, probe: &ProbeSettings) -> Option<VersionTriple>;

    fn detect_architecture(&self) -> Architecture;

    /// 将 `url` 下载到 `dest`。
    fn fetch(&self, url: &str, dest: &Path) -> anyhow::Result<()>;

    /// 阻塞执行安装程序，返回其退出码（仅用于日志）。
    fn run_installer(&self, program: &Path, args: &[String]) -> anyhow::Result<Option<i32>>;

    /// 逐个卸载显示名匹配的条目；单个失败不影响其余条目。
    fn uninstall_matching(&self, filter: &UninstallFilter) -> SweepReport;
}

/// 一次运行的成功终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 执行了安装（全新安装或升级），`version` 为安装后探测到的版本。
    Installed {
        decision: Decision,
        version: VersionTriple,
    },
    /// 已安装版本不低于请求版本。
    UpToDate { installed: VersionTriple },
    /// 有更新版本但禁止升级，需要管理员介入。
    UpgradeAvailable {
        installed: VersionTriple,
        requested: VersionTriple,
    },
}

/// 执行部署流程。
///
/// 异常处理：
/// - 下载未产生文件：`Download`
/// - 安装后探测不到版本：`InstallationFailed`
pub fn provision<H>(config: &ProvisionConfig, host: &H) -> Result<Outcome, ProvisionError>
where
    H: HostOps + ?Sized,
{
    let request = config.request;

    let mut installed = host.detect_installed_version(&config.probe);
    match installed {
        Some(v) => info!("检测到已安装 Python {v}"),
        None => info!("未检测到已安装的 Python"),
    }
    let arch = host.detect_architecture();
    info!("处理器架构: {arch}");

    if policy::needs_uninstall_sweep(installed, request.reinstall) {
        info!(
            "reinstall：卸载所有显示名匹配 `{}` 的条目",
            config.uninstall_filter.as_str()
        );
        let report = host.uninstall_matching(&config.uninstall_filter);
        info!(
            "卸载清扫结束：匹配 {}，执行 {}，失败 {}",
            report.matched, report.attempted, report.failed
        );
        installed = host.detect_installed_version(&config.probe);
        if let Some(v) = installed {
            warn!("卸载后仍检测到 Python {v}，按未安装继续");
        }
    }

    let decision = policy::evaluate(installed, request.version, request.upgrade, request.reinstall);
    info!("请求 Python {}，决策: {decision}", request.version);

    match decision {
        Decision::SkipUpToDate => {
            // 跳过决策只会在探测到已安装版本时出现。
            let current = installed.unwrap_or(request.version);
            if request.version < current {
                info!(
                    "请求版本 {} 低于已安装版本 {current}，不执行降级",
                    request.version
                );
            } else {
                info!("Python {current} 已是最新，无需安装");
            }
            Ok(Outcome::UpToDate { installed: current })
        }
        Decision::SkipUpgradeDisabled => {
            let current = installed.unwrap_or(request.version);
            warn!(
                "有更新版本可用（已安装 {current}，请求 {}），但升级已禁用，需要管理员处理",
                request.version
            );
            Ok(Outcome::UpgradeAvailable {
                installed: current,
                requested: request.version,
            })
        }
        Decision::Install | Decision::Upgrade => {
            let artifact = ScratchArtifact::new(config.scratch_artifact());
            acquire(config, arch, host, &artifact)?;
            let version = install(config, host, artifact.path())?;
            Ok(Outcome::Installed { decision, version })
        }
    }
}

/// 清理旧产物并下载安装程序到临时路径。
fn acquire<H>(
    config: &ProvisionConfig,
    arch: Architecture,
    host: &H,
    artifact: &ScratchArtifact,
) -> Result<(), ProvisionError>
where
    H: HostOps + ?Sized,
{
    let url = config.download_url(arch);
    let path = artifact.path();
    let download_error = |reason: String| ProvisionError::Download {
        url: url.clone(),
        path: path.to_path_buf(),
        reason,
    };

    artifact.remove();
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent).map_err(|e| download_error(format!("{e:#}")))?;
    }

    info!("下载安装程序: {url} -> {}", path.display());
    host.fetch(&url, path)
        .map_err(|e| download_error(format!("{e:#}")))?;
    if !path.is_file() {
        return Err(download_error("下载结束但目标文件不存在".to_string()));
    }
    Ok(())
}

/// 运行安装程序并以复检结果判定成败（忽略安装程序自身的退出码）。
fn install<H>(config: &ProvisionConfig, host: &H, artifact: &Path) -> Result<VersionTriple, ProvisionError>
where
    H: HostOps + ?Sized,
{
    let requested = config.request.version;
    info!(
        "运行安装程序: {} {}",
        artifact.display(),
        config.installer.install_args.join(" ")
    );
    match host.run_installer(artifact, &config.installer.install_args) {
        Ok(code) => info!("安装程序已退出，退出码 {code:?}"),
        Err(e) => warn!("安装程序运行失败: {e:#}"),
    }

    match host.detect_installed_version(&config.probe) {
        Some(v) => {
            if v != requested {
                warn!("安装后探测到的版本 {v} 与请求版本 {requested} 不一致");
            }
            info!("安装完成，当前 Python 版本 {v}");
            Ok(v)
        }
        None => Err(ProvisionError::InstallationFailed { requested }),
    }
}

/// 下载产物守卫：离开作用域时删除文件。
struct ScratchArtifact {
    path: PathBuf,
}

impl ScratchArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// 尽力删除；文件不存在视为已删除。
    fn remove(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("已删除临时文件: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("删除临时文件失败: {}: {e}", self.path.display()),
        }
    }
}

impl Drop for ScratchArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}
