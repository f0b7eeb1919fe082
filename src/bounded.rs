//! # 限时执行
//!
//! 在固定期限内运行异步操作，并在超时后通过取消令牌请求中止底层工作。

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::HookError;

/// 在 `deadline` 内运行 `fut`。超时后取消令牌并返回 [`HookError::Timeout`]。
///
/// 取消是建议性的：composer 可以不观察令牌；引擎只保证不再等待、
/// 也不再应用它之后产生的任何结果。不做自动重试。
pub async fn run_bounded<T>(
    deadline: Duration,
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, HookError> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(value) => Ok(value),
        Err(_) => {
            cancel.cancel();
            Err(HookError::Timeout(deadline))
        }
    }
}
