//! 版本三元组（major.minor.patch）的解析、比较与从命令输出中提取。
//!
//! 约定：
//! - 只支持三段纯数字版本，不处理预发布/构建元数据
//! - 比较按 major → minor → patch 逐段数值比较，不使用字符串比较
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// 匹配输出中第一个点分三段版本号。
static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("版本正则非法"));

/// 点分三段版本号。
///
/// 字段顺序即比较顺序，`Ord` 由派生实现给出逐段数值比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionTriple {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// 版本字符串解析失败。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("无法解析版本号: {0:?}（需要 major.minor.patch 形式）")]
pub struct VersionParseError(pub String);

impl VersionTriple {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// 从任意命令输出中提取第一个版本三元组。
    ///
    /// 示例：
    /// - `Python 3.10.11` -> 3.10.11
    /// - `Python was not found; run without arguments ...` -> `None`
    ///
    /// 返回值：
    /// - 找不到匹配或数值溢出时返回 `None`（调用方视为“未安装”）
    pub fn find_in(output: &str) -> Option<Self> {
        let caps = VERSION_PATTERN.captures(output)?;
        let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        Some(Self::new(part(1)?, part(2)?, part(3)?))
    }
}

impl FromStr for VersionTriple {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u32, VersionParseError> {
            let raw = parts.next().ok_or_else(err)?;
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            raw.parse().map_err(|_| err())
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(version)
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
