//! # Composer Hook Engine
//!
//! 请求生命周期 hook 的解析与调度引擎：在受保护操作执行前，把配置的
//! composer 引用（HTTPS URL 或本地路径）解析为 handler —— 每个配置在
//! 进程生命周期内只解析一次 —— 调用它，并把归一化后的结果增量合并回
//! 调用方的执行上下文。
//!
//! ## 核心职责
//!
//! - **记忆化解析**：首次调用解析并缓存 handler，并发调用等待同一次在途
//!   解析，失败不缓存、可重试
//! - **双路调用**：本地函数经注入的模块加载器解析，远程端点走 HTTPS POST；
//!   阻塞调用受限时包装约束并支持协作式取消
//! - **归一化与合并**：任意 handler 输出统一为 `{status, message, data?}`
//!   信封，SUCCESS 的上下文增量（目前仅 headers）交回调用方合并
//!
//! 三类独立的失败面（解析失败、执行超时、响应不合法）在编排器边界
//! 折叠为单一 message 的错误，向上只呈现一种统一契约。

pub mod bounded;
pub mod config;
pub mod envelope;
pub mod error;
pub mod invoker;
pub mod orchestrator;
pub mod payload;
pub mod resolver;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ComposerHookConfig, ComposerReference, HookEngineConfig};
pub use envelope::{ContextDelta, HookVerdict, ResponseEnvelope};
pub use error::{HookError, HookFailure};
pub use invoker::ComposerHandler;
pub use invoker::local::{ComposerFn, ModuleLoader, StaticModuleLoader};
pub use orchestrator::HookOrchestrator;
pub use payload::{HookPayload, PayloadContext};
pub use telemetry::{LogAgent, TelemetryAgent};
