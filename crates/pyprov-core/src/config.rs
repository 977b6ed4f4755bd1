//! 运行配置：配置文件模型（可选 JSON）与解析后的不可变运行配置。
//!
//! 约定：
//! - 配置文件所有字段都有默认值（`#[serde(default)]`），未知字段直接报错
//! - 允许安装的版本清单不在配置文件中，只能随程序发布
//! - [`ProvisionConfig`] 构建后不再修改，以引用方式传入策略/下载/安装各步骤
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::paths;
use crate::uninstall::UninstallFilter;
use crate::version::VersionTriple;

/// 宿主处理器位宽。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    X86,
    X64,
}

impl Architecture {
    /// 按 CPU 架构字符串（如 `x86_64`、`aarch64`、`x86`）映射；未知按 32 位处理。
    pub fn from_cpu_arch(arch: Option<&str>) -> Self {
        match arch {
            Some(a) if a.contains("64") => Self::X64,
            _ => Self::X86,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::X86 => "32-bit",
            Self::X64 => "64-bit",
        })
    }
}

/// 下载相关配置。
///
/// 下载地址：`{base_url}/{version}/{artifact_name}-{version}{suffix}.{extension}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcquisitionSettings {
    /// 供应商下载根地址。
    pub base_url: String,
    /// 产物文件名前缀。
    pub artifact_name: String,
    /// 产物扩展名（不含点）。
    pub extension: String,
    /// 64 位产物的文件名后缀；32 位无后缀。
    pub x64_suffix: String,
    /// 下载超时（秒）；为空表示不限时。
    pub timeout_secs: Option<u64>,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.python.org/ftp/python".to_string(),
            artifact_name: "python".to_string(),
            extension: "exe".to_string(),
            x64_suffix: "-amd64".to_string(),
            timeout_secs: None,
        }
    }
}

impl AcquisitionSettings {
    pub fn download_url(&self, version: VersionTriple, arch: Architecture) -> String {
        let suffix = match arch {
            Architecture::X64 => self.x64_suffix.as_str(),
            Architecture::X86 => "",
        };
        format!(
            "{}/{version}/{}-{version}{suffix}.{}",
            self.base_url.trim_end_matches('/'),
            self.artifact_name,
            self.extension
        )
    }

    /// 本地临时文件名，只由版本决定（与架构无关）。
    pub fn scratch_file_name(&self, version: VersionTriple) -> String {
        format!("{}-{version}-installer.{}", self.artifact_name, self.extension)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// 已安装版本探测配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeSettings {
    /// 按优先级排列的候选命令名；只使用第一个能在搜索路径中找到的。
    pub commands: Vec<String>,
    /// 查询版本的参数。
    pub version_flag: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            commands: vec!["python".into(), "python3".into(), "py".into()],
            version_flag: "--version".to_string(),
        }
    }
}

/// 安装/卸载配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerSettings {
    /// 静默安装参数：无交互、为所有用户安装、加入系统 PATH。
    pub install_args: Vec<String>,
    /// 卸载清扫时匹配已安装程序显示名的正则。
    pub uninstall_name_pattern: String,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            install_args: vec![
                "/quiet".into(),
                "InstallAllUsers=1".into(),
                "PrependPath=1".into(),
            ],
            uninstall_name_pattern: r"^Python \d+\.\d+\.\d+".to_string(),
        }
    }
}

/// 宿主要求。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostSettings {
    /// 最低 Windows 内部版本号（9600 = Windows 8.1 / Server 2012 R2）。
    pub min_os_build: u32,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self { min_os_build: 9600 }
    }
}

impl HostSettings {
    /// 校验宿主内部版本号；无法确定时同样视为不支持。
    pub fn check_build(&self, build: Option<u32>) -> Result<(), ProvisionError> {
        match build {
            Some(b) if b >= self.min_os_build => Ok(()),
            other => Err(ProvisionError::UnsupportedHost {
                found: other.map_or_else(|| "未知".to_string(), |b| b.to_string()),
                required: self.min_os_build,
            }),
        }
    }
}

/// 配置文件根对象（对应 `--config` 指定的 JSON）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvisionSettings {
    pub acquisition: AcquisitionSettings,
    pub probe: ProbeSettings,
    pub installer: InstallerSettings,
    pub host: HostSettings,
    /// 下载临时目录；相对路径按配置文件所在目录解析。
    pub scratch_dir: Option<PathBuf>,
}

impl ProvisionSettings {
    /// 读取并解析配置文件。
    ///
    /// 异常处理：
    /// - 文件读取失败或 JSON 非法（含未知字段）返回 `Config` 错误
    pub fn load(path: &Path) -> Result<Self, ProvisionError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ProvisionError::Config(format!("读取配置文件失败: {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProvisionError::Config(format!("解析配置文件失败: {}: {e}", path.display())))
    }
}

/// 调用方请求（版本已通过允许清单校验）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub version: VersionTriple,
    pub upgrade: bool,
    pub reinstall: bool,
}

/// 解析完成的不可变运行配置。
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub request: ProvisionRequest,
    pub acquisition: AcquisitionSettings,
    pub probe: ProbeSettings,
    pub installer: InstallerSettings,
    pub host: HostSettings,
    pub scratch_dir: PathBuf,
    pub uninstall_filter: UninstallFilter,
}

impl ProvisionConfig {
    /// 由请求与配置文件内容构建运行配置。
    ///
    /// 参数：
    /// - `settings_dir`：配置文件所在目录（用于解析相对 `scratch_dir`）；无配置文件时为 `None`
    ///
    /// 异常处理：
    /// - 卸载匹配正则非法、`scratch_dir` 为空时返回 `Config` 错误
    pub fn new(
        request: ProvisionRequest,
        settings: ProvisionSettings,
        settings_dir: Option<&Path>,
    ) -> Result<Self, ProvisionError> {
        let uninstall_filter = UninstallFilter::new(&settings.installer.uninstall_name_pattern)?;
        let scratch_dir = match settings.scratch_dir {
            Some(raw) => {
                let base = settings_dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                paths::resolve_path(&base, &raw)
                    .map_err(|e| ProvisionError::Config(format!("scratch_dir 非法: {e}")))?
            }
            None => paths::default_scratch_dir(),
        };
        Ok(Self {
            request,
            acquisition: settings.acquisition,
            probe: settings.probe,
            installer: settings.installer,
            host: settings.host,
            scratch_dir,
            uninstall_filter,
        })
    }

    pub fn download_url(&self, arch: Architecture) -> String {
        self.acquisition.download_url(self.request.version, arch)
    }

    /// 本次请求版本对应的本地临时产物路径。
    pub fn scratch_artifact(&self) -> PathBuf {
        self.scratch_dir
            .join(self.acquisition.scratch_file_name(self.request.version))
    }
}
