//! # Handler 解析与记忆化
//!
//! 按配置把 composer 引用解析为 handler，并在配置的整个生命周期内缓存。
//! 首个调用方完成解析并写入缓存，并发到达的调用方等待同一次在途解析；
//! 之后的调用直接读缓存，不再重新解析或校验引用。解析失败不会被缓存。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::{ComposerHookConfig, ComposerReference};
use crate::error::HookError;
use crate::invoker::ComposerHandler;
use crate::invoker::local::{LocalHandler, ModuleLoader};
use crate::invoker::remote::RemoteHandler;

pub struct HandlerResolver {
    config: ComposerHookConfig,
    base_dir: PathBuf,
    loader: Arc<dyn ModuleLoader>,
    /// 写一次读多次的缓存槽，由解析器独占持有，不暴露写入口
    resolved: OnceCell<Arc<dyn ComposerHandler>>,
}

impl HandlerResolver {
    pub fn new(config: ComposerHookConfig, base_dir: PathBuf, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            config,
            base_dir,
            loader,
            resolved: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ComposerHookConfig {
        &self.config
    }

    /// 解析（或返回缓存的）handler。
    ///
    /// hook 的身份在进程生命周期内固定：即使底层模块或端点之后会解析出
    /// 不同结果，也不再重新解析。
    pub async fn resolve(&self) -> Result<Arc<dyn ComposerHandler>, HookError> {
        self.resolved
            .get_or_try_init(|| async {
                let handler: Arc<dyn ComposerHandler> = match self.config.reference() {
                    ComposerReference::Remote(url) => Arc::new(
                        RemoteHandler::new(url, self.config.blocking, self.config.timeout())
                            .map_err(|source| HookError::Resolution {
                                reference: self.config.composer.clone(),
                                source: source.into(),
                            })?,
                    ),
                    ComposerReference::Local(reference) => Arc::new(
                        LocalHandler::resolve(
                            &reference,
                            self.loader.as_ref(),
                            &self.base_dir,
                            self.config.blocking,
                            self.config.timeout(),
                        )
                        .await?,
                    ),
                };
                tracing::debug!(composer = %self.config.composer, "composer handler resolved");
                Ok(handler)
            })
            .await
            .cloned()
    }
}
