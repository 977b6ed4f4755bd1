//! 安装程序下载（阻塞 HTTP，流式写入本地文件）。
//!
//! 作者：pyprov 项目组
//! 创建时间：2026-10-16
//! 修改时间：2026-10-16

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;

/// 阻塞式下载器。
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// 创建下载器。
    ///
    /// 参数：
    /// - `timeout`：整体超时；`None` 表示不限时（网络停滞会一直阻塞）
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pyprov/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self { client })
    }

    /// 下载 `url` 到 `dest`，返回写入的字节数。
    ///
    /// 异常处理：
    /// - 连接失败、非 2xx 状态码、写文件失败均返回错误
    /// - 状态码非 2xx 时不会创建目标文件
    pub fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("请求失败: {url}"))?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let mut file = File::create(dest).with_context(|| format!("创建文件失败: {}", dest.display()))?;
        let written = response
            .copy_to(&mut file)
            .with_context(|| format!("写入下载内容失败: {}", dest.display()))?;
        file.flush()
            .with_context(|| format!("写入下载内容失败: {}", dest.display()))?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use httpmock::prelude::*;
    use uuid::Uuid;

    struct CleanupDir(PathBuf);

    impl Drop for CleanupDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn unique_temp_dir() -> (PathBuf, CleanupDir) {
        let dir = std::env::temp_dir().join(format!("pyprov-download-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        (dir.clone(), CleanupDir(dir))
    }

    #[test]
    fn fetch_writes_body_to_destination() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/3.10.11/python-3.10.11-amd64.exe");
            then.status(200).body("MZ-fake-installer");
        });
        let (dir, _cleanup) = unique_temp_dir();
        let dest = dir.join("python-3.10.11-installer.exe");

        let downloader = Downloader::new(None).unwrap();
        let written = downloader
            .fetch_to(&server.url("/3.10.11/python-3.10.11-amd64.exe"), &dest)
            .unwrap();

        mock.assert();
        assert_eq!(written, "MZ-fake-installer".len() as u64);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "MZ-fake-installer");
    }

    #[test]
    fn fetch_sends_user_agent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/a.exe")
                .header("User-Agent", concat!("pyprov/", env!("CARGO_PKG_VERSION")));
            then.status(200).body("x");
        });
        let (dir, _cleanup) = unique_temp_dir();

        Downloader::new(Some(Duration::from_secs(30)))
            .unwrap()
            .fetch_to(&server.url("/a.exe"), &dir.join("a.exe"))
            .unwrap();

        mock.assert();
    }

    #[test]
    fn not_found_is_an_error_and_creates_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/2.7.18/python-2.7.18-amd64.exe");
            then.status(404).body("Not Found");
        });
        let (dir, _cleanup) = unique_temp_dir();
        let dest = dir.join("python-2.7.18-installer.exe");

        let err = Downloader::new(None)
            .unwrap()
            .fetch_to(&server.url("/2.7.18/python-2.7.18-amd64.exe"), &dest)
            .unwrap_err();

        assert!(err.to_string().contains("404"), "{err}");
        assert!(!dest.exists());
    }
}
