//! # 遥测协作者
//!
//! 包裹编排器顶层调用的追踪段。实现方必须恰好执行一次 handler
//! 并原样传播其结果；默认实现只记日志，不上报任何后端。

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::error::HookFailure;

#[async_trait]
pub trait TelemetryAgent: Send + Sync {
    async fn segment(
        &self,
        name: &str,
        record: bool,
        handler: BoxFuture<'_, Result<(), HookFailure>>,
    ) -> Result<(), HookFailure>;
}

/// 日志兜底实现
#[derive(Debug, Default)]
pub struct LogAgent;

#[async_trait]
impl TelemetryAgent for LogAgent {
    async fn segment(
        &self,
        name: &str,
        record: bool,
        handler: BoxFuture<'_, Result<(), HookFailure>>,
    ) -> Result<(), HookFailure> {
        tracing::debug!(segment = name, record, "entering telemetry segment");
        handler.await
    }
}
