//! Python 运行时部署工具核心库（平台无关）。
//!
//! 功能：
//! - 定义版本三元组、允许安装的版本清单与安装决策（纯函数）
//! - 定义运行配置（下载地址模板、探测命令、安装参数等）与路径约定
//! - 定义卸载条目模型与卸载命令推导
//! - 通过 [`provision::HostOps`] 抽象宿主能力，编排“探测 → 决策 → 下载 → 安装 → 复检”流程
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

pub mod cmdline;
pub mod config;
pub mod error;
pub mod paths;
pub mod policy;
pub mod provision;
pub mod uninstall;
pub mod version;
