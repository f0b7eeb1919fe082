//! # 本地调用器
//!
//! 通过注入的模块加载协作者把 composer 引用解析为可调用对象；
//! 调用在限时包装下执行并归一化结果。加载失败是独立于调用的致命解析错误。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;

use super::ComposerHandler;
use crate::bounded::run_bounded;
use crate::envelope::{self, HookVerdict};
use crate::error::HookError;
use crate::payload::HookPayload;

/// 本地 composer 函数。可返回任意 JSON 值：带 `status` 字段的对象按信封
/// 解释，其余值合成 SUCCESS 信封。取消令牌是建议性的，可以忽略。
#[async_trait]
pub trait ComposerFn: Send + Sync {
    async fn call(
        &self,
        payload: &HookPayload,
        cancel: CancellationToken,
    ) -> anyhow::Result<JsonValue>;
}

/// 模块加载协作者：将 composer 引用相对 `base_dir` 解析为可调用对象。
/// 引擎不关心代码如何定位（动态库、插件注册表、编译期注册均可）。
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, reference: &str, base_dir: &Path) -> anyhow::Result<Arc<dyn ComposerFn>>;
}

/// 注册表式加载器：按引用名查找编译期注册的 composer
#[derive(Default)]
pub struct StaticModuleLoader {
    entries: HashMap<String, Arc<dyn ComposerFn>>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Into<String>>(&mut self, reference: T, composer: Arc<dyn ComposerFn>) {
        self.entries.insert(reference.into(), composer);
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn load(&self, reference: &str, _base_dir: &Path) -> anyhow::Result<Arc<dyn ComposerFn>> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Local composer not found: {reference}"))
    }
}

/// 已解析的本地 composer handler
pub struct LocalHandler {
    reference: String,
    composer: Arc<dyn ComposerFn>,
    blocking: bool,
    timeout: Duration,
}

impl std::fmt::Debug for LocalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHandler")
            .field("reference", &self.reference)
            .field("blocking", &self.blocking)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LocalHandler {
    /// 解析本身是异步的（加载代码），失败时返回解析错误，不会被缓存
    pub async fn resolve(
        reference: &str,
        loader: &dyn ModuleLoader,
        base_dir: &Path,
        blocking: bool,
        timeout: Duration,
    ) -> Result<Self, HookError> {
        let composer =
            loader
                .load(reference, base_dir)
                .await
                .map_err(|source| HookError::Resolution {
                    reference: reference.to_string(),
                    source,
                })?;

        Ok(Self {
            reference: reference.to_string(),
            composer,
            blocking,
            timeout,
        })
    }
}

#[async_trait]
impl ComposerHandler for LocalHandler {
    async fn call(&self, payload: &HookPayload) -> Result<HookVerdict, HookError> {
        tracing::debug!(reference = %self.reference, "invoking local composer");
        let cancel = CancellationToken::new();

        if !self.blocking {
            // fire-and-forget：composer 照常执行（保留副作用），结果只记日志
            let composer = Arc::clone(&self.composer);
            let payload = payload.clone();
            let reference = self.reference.clone();
            tokio::spawn(async move {
                if let Err(err) = composer.call(&payload, cancel).await {
                    tracing::warn!(
                        reference = %reference,
                        error = %err,
                        "non-blocking local composer failed"
                    );
                }
            });
            return Ok(HookVerdict::success("Local function invoked successfully"));
        }

        let outcome = run_bounded(
            self.timeout,
            &cancel,
            self.composer.call(payload, cancel.child_token()),
        )
        .await?;

        match outcome {
            Ok(value) => Ok(envelope::normalize_value(&value, true)),
            Err(err) => {
                let message = err.to_string();
                let message = if message.is_empty() {
                    format!("Error while invoking local function {}", self.reference)
                } else {
                    message
                };
                Ok(HookVerdict::Error { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoComposer;

    #[async_trait]
    impl ComposerFn for EchoComposer {
        async fn call(
            &self,
            payload: &HookPayload,
            _cancel: CancellationToken,
        ) -> anyhow::Result<JsonValue> {
            Ok(json!({
                "status": "success",
                "message": "echo",
                "data": { "headers": payload.context.headers },
            }))
        }
    }

    struct FailingComposer;

    #[async_trait]
    impl ComposerFn for FailingComposer {
        async fn call(
            &self,
            _payload: &HookPayload,
            _cancel: CancellationToken,
        ) -> anyhow::Result<JsonValue> {
            anyhow::bail!("kaboom")
        }
    }

    fn loader_with(reference: &str, composer: Arc<dyn ComposerFn>) -> StaticModuleLoader {
        let mut loader = StaticModuleLoader::new();
        loader.register(reference, composer);
        loader
    }

    #[tokio::test]
    async fn test_resolve_unknown_reference_fails() {
        let loader = StaticModuleLoader::new();
        let result = LocalHandler::resolve(
            "./hooks/missing.js",
            &loader,
            Path::new("."),
            true,
            Duration::from_secs(30),
        )
        .await;

        match result {
            Err(HookError::Resolution { reference, .. }) => {
                assert_eq!(reference, "./hooks/missing.js")
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocking_call_normalizes_envelope() {
        let loader = loader_with("./hooks/echo.js", Arc::new(EchoComposer));
        let handler = LocalHandler::resolve(
            "./hooks/echo.js",
            &loader,
            Path::new("."),
            true,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        let payload = HookPayload::new().with_header("x-a", "1");
        let verdict = handler.call(&payload).await.unwrap();
        assert!(verdict.is_success());
        let delta = verdict.context_delta().unwrap();
        assert_eq!(delta.headers.get("x-a"), Some(&"1".to_string()));
    }

    #[tokio::test]
    async fn test_blocking_call_surfaces_composer_error() {
        let loader = loader_with("./hooks/fail.js", Arc::new(FailingComposer));
        let handler = LocalHandler::resolve(
            "./hooks/fail.js",
            &loader,
            Path::new("."),
            true,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        let verdict = handler.call(&HookPayload::new()).await.unwrap();
        assert_eq!(
            verdict,
            HookVerdict::Error {
                message: "kaboom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_blocking_call_ignores_composer_error() {
        let loader = loader_with("./hooks/fail.js", Arc::new(FailingComposer));
        let handler = LocalHandler::resolve(
            "./hooks/fail.js",
            &loader,
            Path::new("."),
            false,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        let verdict = handler.call(&HookPayload::new()).await.unwrap();
        assert!(verdict.is_success());
    }
}
