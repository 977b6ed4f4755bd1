//! Windows 宿主能力封装（提权、系统信息、注册表、命令探测、进程执行、卸载清扫）。
//!
//! 目标：
//! - 将 Windows 专有 API 与系统操作集中封装，上层只通过函数调用获取宿主状态
//! - 统一错误处理风格（以 `anyhow::Result` 形式向上返回）
//! - 非 Windows 平台提供降级实现（视为“无注册表、无法提权”），便于跨平台构建与测试
//!
//! 安全注意：
//! - 安装/卸载为所有用户生效，需要管理员权限
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

pub mod elevation;
pub mod host;
pub mod probe;
pub mod process;
pub mod registry;
pub mod uninstall;
