//! # 错误类型
//!
//! 引擎内部区分四类失败（解析、传输、超时、handler自报错误），仅用于日志判别；
//! 在编排器边界统一折叠为单一 message 的 [`HookFailure`]，不向调用方暴露结构化错误。

use std::time::Duration;

use thiserror::Error;

/// 引擎内部错误分类
#[derive(Debug, Error)]
pub enum HookError {
    /// composer 引用无法解析为可调用对象（本地加载失败等）。
    /// 解析失败不会被缓存，后续调用可以重试。
    #[error("unable to resolve composer `{reference}`: {source}")]
    Resolution {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    /// 远程调用在传输层失败（DNS、连接拒绝、非法响应）
    #[error("remote composer call failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 阻塞调用超过期限。与普通失败同等对待，但消息可判别，
    /// 便于运维区分超时与功能性失败。
    #[error("composer invocation timed out after {0:?}")]
    Timeout(Duration),

    /// handler 自身返回了非 SUCCESS 结果，message 为 handler 给出的内容
    #[error("{message}")]
    HandlerReported { message: String },
}

impl HookError {
    /// 日志用途的稳定分类名
    pub fn kind(&self) -> &'static str {
        match self {
            HookError::Resolution { .. } => "resolution",
            HookError::Transport(_) => "transport",
            HookError::Timeout(_) => "timeout",
            HookError::HandlerReported { .. } => "handler",
        }
    }
}

/// 引擎对外的唯一错误形态：单一 message 字符串
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookFailure {
    pub message: String,
}

impl From<HookError> for HookFailure {
    fn from(err: HookError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = HookError> = std::result::Result<T, E>;
