//! 媒体下载边界

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP 状态异常: {status} ({url})")]
    Status { url: String, status: u16 },
}

/// 按 URL 拉取媒体字节，单次请求受固定超时约束
pub trait MediaFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36")
            .build()
            .unwrap();
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFetcher for HttpFetcher {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        debug!("⬇️ Fetching {} (timeout {:?})", url, timeout);
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()?
            .error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}
