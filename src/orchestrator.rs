//! # Hook 编排器
//!
//! 每个请求生命周期调用一次的顶层入口：取得（缓存的）handler，
//! 用请求载荷调用它；阻塞 hook 把结果增量合并回在途请求，
//! 失败则中止受保护操作。所有内部错误在这里折叠为单一 message。

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ComposerHookConfig;
use crate::envelope::{ContextDelta, HookVerdict};
use crate::error::{HookError, HookFailure};
use crate::invoker::local::ModuleLoader;
use crate::payload::HookPayload;
use crate::resolver::HandlerResolver;
use crate::telemetry::{LogAgent, TelemetryAgent};

const SEGMENT_NAME: &str = "before_all_hook:invoke";

pub struct HookOrchestrator {
    resolver: HandlerResolver,
    telemetry: Arc<dyn TelemetryAgent>,
}

impl HookOrchestrator {
    pub fn new(config: ComposerHookConfig, base_dir: PathBuf, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            resolver: HandlerResolver::new(config, base_dir, loader),
            telemetry: Arc::new(LogAgent),
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetryAgent>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// 在受保护操作执行前调用。
    ///
    /// 阻塞配置下，SUCCESS 结果中可更新的上下文增量通过 `update_context`
    /// 交回调用方（至多调用一次）；任何失败都以单一 message 的
    /// [`HookFailure`] 拒绝，且不发生部分上下文变更。
    /// 非阻塞配置下调用发起后即成功，只有解析失败仍会拒绝。
    pub async fn invoke<F>(&self, payload: &HookPayload, update_context: F) -> Result<(), HookFailure>
    where
        F: FnOnce(ContextDelta) + Send,
    {
        let telemetry = Arc::clone(&self.telemetry);
        telemetry
            .segment(
                SEGMENT_NAME,
                true,
                Box::pin(async move {
                    self.run(payload, update_context).await.map_err(|err| {
                        tracing::error!(
                            kind = err.kind(),
                            error = %err,
                            "error while invoking before-all hook"
                        );
                        HookFailure::from(err)
                    })
                }),
            )
            .await
    }

    async fn run<F>(&self, payload: &HookPayload, update_context: F) -> Result<(), HookError>
    where
        F: FnOnce(ContextDelta) + Send,
    {
        let handler = self.resolver.resolve().await?;
        let verdict = handler.call(payload).await?;

        if !self.resolver.config().blocking {
            // 非阻塞：调用已经发起（副作用已发生），信封不再检查
            return Ok(());
        }

        match verdict {
            HookVerdict::Success { .. } => {
                if let Some(delta) = verdict.context_delta() {
                    update_context(delta);
                }
                Ok(())
            }
            HookVerdict::Error { message } => Err(HookError::HandlerReported { message }),
        }
    }
}
