//! Python 运行时部署工具（pyprov）。
//!
//! 职责：
//! - 按允许清单校验请求版本，探测本机已安装的 Python
//! - 按策略决定安装、升级或跳过；需要时下载官方安装程序并静默安装
//! - `--reinstall` 时先卸载所有已注册的 Python，再全新安装
//! - 每一步写入控制台与日志文件，退出码区分失败类别
//!
//! 权限要求：
//! - 默认命令需要管理员权限（全机安装、写 HKLM）；未提权时以 UAC 重新启动自身
//! - `detect` / `doctor` 为只读命令，不要求提权
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

mod download;
mod logging;
mod system;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use pyprov_core::config::{ProvisionConfig, ProvisionRequest, ProvisionSettings};
use pyprov_core::error::ProvisionError;
use pyprov_core::paths;
use pyprov_core::policy::{AllowList, DEFAULT_VERSION};
use pyprov_core::provision::{self, Outcome};
use pyprov_windows::elevation::{self, Elevation};
use pyprov_windows::host;
use tracing::{error, info, warn};

use crate::download::Downloader;
use crate::system::SystemHost;

/// 命令行参数。
///
/// 说明：
/// - 不带子命令时执行部署流程
/// - 请求版本参数名为 `--python-version`，`--version` 输出本工具版本
#[derive(Debug, Parser)]
#[command(name = "pyprov", version, about = "在 Windows 上部署指定版本的 Python")]
struct Cli {
    /// 请求安装的 Python 版本（必须在允许清单中）。
    #[arg(long, default_value = DEFAULT_VERSION)]
    python_version: String,

    /// 已安装版本较旧时是否允许升级。
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    upgrade: bool,

    /// 卸载所有已注册的 Python 后全新安装。
    #[arg(long, default_value_t = false)]
    reinstall: bool,

    /// JSON 配置文件。
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 日志文件路径（默认位于临时目录）。
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// 输出已安装版本与处理器位宽（不做系统修改）。
    Detect,
    /// 环境自检（管理员权限、系统版本、路径、允许清单等）。
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_file = cli.log_file.clone().unwrap_or_else(paths::default_log_file);
    if let Err(e) = logging::init(&log_file) {
        eprintln!("{e:#}");
    }

    let result = match cli.command {
        None => run(&cli),
        Some(Commands::Detect) => detect(&cli),
        Some(Commands::Doctor) => doctor(&cli, &log_file),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            let code = err
                .downcast_ref::<ProvisionError>()
                .map_or(1, ProvisionError::exit_code);
            ExitCode::from(code)
        }
    }
}

/// 执行部署流程。
///
/// 主要步骤：
/// 1) 校验请求版本（先于任何探测、提权、网络或安装操作）
/// 2) 加载配置、检查系统版本
/// 3) 确保管理员权限（未提权时重新启动自身并退出）
/// 4) 探测、决策、安装并复检
///
/// 异常处理：
/// - 所有致命错误以 [`ProvisionError`] 返回，由 `main` 映射为退出码
fn run(cli: &Cli) -> Result<()> {
    info!("pyprov {} 启动，请求 Python {}", env!("CARGO_PKG_VERSION"), cli.python_version);
    let version = AllowList::builtin().validate(&cli.python_version)?;
    let request = ProvisionRequest {
        version,
        upgrade: cli.upgrade,
        reinstall: cli.reinstall,
    };

    let config = load_config(cli, request)?;
    config.host.check_build(host::windows_build())?;

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    match elevation::ensure_elevated(&args).map_err(|e| ProvisionError::Elevation(format!("{e:#}")))? {
        Elevation::AlreadyElevated => {}
        Elevation::Relaunched => {
            info!("已请求以管理员身份重新启动，当前进程退出");
            return Ok(());
        }
    }

    let downloader = Downloader::new(config.acquisition.timeout())?;
    let host = SystemHost::new(downloader);
    match provision::provision(&config, &host)? {
        Outcome::Installed { decision, version } => info!("完成（{decision}）：Python {version} 已就绪"),
        Outcome::UpToDate { installed } => info!("完成：保持已安装的 Python {installed}"),
        Outcome::UpgradeAvailable { installed, requested } => {
            warn!("完成：Python {installed} 未升级到 {requested}（升级已禁用）")
        }
    }
    Ok(())
}

/// 读取配置文件（未指定时使用默认值）。
fn load_settings(cli: &Cli) -> Result<(ProvisionSettings, Option<PathBuf>), ProvisionError> {
    match &cli.config {
        Some(path) => {
            info!("读取配置文件: {}", path.display());
            let settings = ProvisionSettings::load(path)?;
            Ok((settings, path.parent().map(Path::to_path_buf)))
        }
        None => Ok((ProvisionSettings::default(), None)),
    }
}

fn load_config(cli: &Cli, request: ProvisionRequest) -> Result<ProvisionConfig, ProvisionError> {
    let (settings, dir) = load_settings(cli)?;
    ProvisionConfig::new(request, settings, dir.as_deref())
}

/// 仅探测并输出结果。
fn detect(cli: &Cli) -> Result<()> {
    let (settings, _) = load_settings(cli)?;
    let installed = system::detect_installed(&settings.probe);
    println!("installed = {}", installed.map_or_else(|| "none".to_string(), |v| v.to_string()));
    println!("architecture = {}", host::architecture());
    Ok(())
}

/// 环境自检（用于排障）。
///
/// 输出：
/// - 是否管理员运行、系统内部版本及是否满足最低要求
/// - 处理器位宽、已安装版本
/// - 日志文件与下载临时目录、允许清单
fn doctor(cli: &Cli, log_file: &Path) -> Result<()> {
    let request = ProvisionRequest {
        version: DEFAULT_VERSION.parse()?,
        upgrade: cli.upgrade,
        reinstall: cli.reinstall,
    };
    let config = load_config(cli, request)?;
    let build = host::windows_build();

    println!("admin = {}", elevation::is_running_as_admin()?);
    println!("os = {}", host::os_description());
    println!(
        "windows_build = {}",
        build.map_or_else(|| "unknown".to_string(), |b| b.to_string())
    );
    println!(
        "meets_min_build_{} = {}",
        config.host.min_os_build,
        config.host.check_build(build).is_ok()
    );
    println!("architecture = {}", host::architecture());
    println!(
        "installed = {}",
        system::detect_installed(&config.probe).map_or_else(|| "none".to_string(), |v| v.to_string())
    );
    println!("log_file = {}", log_file.display());
    println!("scratch_dir = {}", config.scratch_dir.display());
    println!("allowed_versions = {}", AllowList::builtin());
    Ok(())
}
