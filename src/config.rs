//! # Hook 配置
//!
//! 启动时设定一次，之后不再变更。composer 引用按形态分类为远程或本地，
//! 不做任何探测。

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

/// composer 引用的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerReference {
    /// 绝对 HTTPS URL
    Remote(Url),
    /// 本地模块/函数路径
    Local(String),
}

impl ComposerReference {
    /// 仅接受带主机名的绝对 https URL，其余（包括 http）一律视为本地引用
    pub fn classify(reference: &str) -> Self {
        if let Ok(url) = Url::parse(reference) {
            if url.scheme() == "https" && url.has_host() {
                return ComposerReference::Remote(url);
            }
        }
        ComposerReference::Local(reference.to_string())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ComposerReference::Remote(_))
    }
}

/// 单个 composer hook 的静态配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerHookConfig {
    /// composer 引用（HTTPS URL 或本地路径）
    pub composer: String,
    /// 是否阻塞主流程等待结果。非阻塞 hook 发起调用后立即成功返回。
    #[serde(default)]
    pub blocking: bool,
    /// 阻塞调用的超时时间（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl ComposerHookConfig {
    pub fn new<T: Into<String>>(composer: T) -> Self {
        Self {
            composer: composer.into(),
            blocking: false,
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reference(&self) -> ComposerReference {
        ComposerReference::classify(&self.composer)
    }
}

/// 引擎配置。未配置 `before_all` 时引擎为空操作。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookEngineConfig {
    /// 受保护操作执行前触发的 hook
    #[serde(default)]
    pub before_all: Option<ComposerHookConfig>,
    /// 本地 composer 解析的基准目录
    #[serde(default)]
    pub base_dir: PathBuf,
}

impl HookEngineConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse hook engine config")
    }
}
