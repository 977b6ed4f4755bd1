//! 日志初始化：控制台（stderr）+ 追加写入的日志文件。
//!
//! 日志文件格式：
//! - 每行 `<YYYY-MM-DD HH:MM:SS> - <消息>`，UTF-8
//! - ERROR / WARN 级别在消息前加 `ERROR: ` / `WARNING: `，便于区分致命错误
//! - 每条日志都以追加模式重新打开文件；本程序从不截断或轮转日志
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// 初始化全局日志。
///
/// 参数：
/// - `log_file`：日志文件路径（父目录不存在时尝试创建）
///
/// 异常处理：
/// - 全局 subscriber 已被设置时返回错误
pub fn init(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()));

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer(log_file))
        .try_init()
        .context("初始化日志失败")?;
    Ok(())
}

/// 日志文件层（INFO 及以上）。
pub fn file_layer<S>(path: &Path) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(AppendFile::new(path))
        .with_filter(LevelFilter::INFO)
}

/// `<时间戳> - <消息>` 单行格式。
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} - {}",
            timestamp(),
            severity_prefix(*event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn severity_prefix(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR: ",
        Level::WARN => "WARNING: ",
        _ => "",
    }
}

/// 本地时间；无法确定本地时区时退回 UTC。
fn timestamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format).unwrap_or_default()
}

/// 每次写日志时以追加模式打开文件。
#[derive(Debug, Clone)]
struct AppendFile {
    path: PathBuf,
}

impl AppendFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl<'a> MakeWriter<'a> for AppendFile {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        match OpenOptions::new().create(true).append(true).open(&self.path) {
            Ok(file) => LogSink::File(file),
            // 日志文件不可写时丢弃该行，不影响主流程。
            Err(_) => LogSink::Discard,
        }
    }
}

enum LogSink {
    File(File),
    Discard,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(f) => f.write(buf),
            Self::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(f) => f.flush(),
            Self::Discard => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tracing::{debug, error, info, warn};
    use uuid::Uuid;

    struct CleanupDir(PathBuf);

    impl Drop for CleanupDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn split_line(line: &str) -> (&str, &str) {
        let (ts, msg) = line.split_once(" - ").expect("line has separator");
        assert_eq!(ts.len(), "2026-10-16 09:30:00".len(), "timestamp: {ts}");
        assert!(ts.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ':' || c == ' '));
        (ts, msg)
    }

    #[test]
    fn writes_timestamped_lines_with_severity() {
        let dir = std::env::temp_dir().join(format!("pyprov-log-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let _cleanup = CleanupDir(dir.clone());
        let path = dir.join("pyprov-install.log");
        std::fs::write(&path, "existing line\n").unwrap();

        let subscriber = tracing_subscriber::registry().with(file_layer(&path));
        tracing::subscriber::with_default(subscriber, || {
            info!("开始安装 Python 3.12.9");
            debug!("not written");
            warn!("有更新版本可用");
            error!("下载失败");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4, "{content}");
        assert_eq!(lines[0], "existing line", "log must be appended, never truncated");
        assert_eq!(split_line(lines[1]).1, "开始安装 Python 3.12.9");
        assert_eq!(split_line(lines[2]).1, "WARNING: 有更新版本可用");
        assert_eq!(split_line(lines[3]).1, "ERROR: 下载失败");
    }

    #[test]
    fn unwritable_log_file_is_ignored() {
        let path = std::env::temp_dir()
            .join(format!("pyprov-missing-{}", Uuid::new_v4()))
            .join("nested")
            .join("x.log");
        let subscriber = tracing_subscriber::registry().with(file_layer(&path));
        tracing::subscriber::with_default(subscriber, || info!("dropped"));
        assert!(!path.exists());
    }
}
