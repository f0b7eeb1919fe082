//! # Composer 调用器
//!
//! 本地与远程两种调用策略，统一在 [`ComposerHandler`] 接口之后。
//! handler 自报的失败以 [`HookVerdict::Error`] 的形式显式返回，
//! 只有基础设施层面的失败（传输、超时）才走 `Err` 路径，
//! 由编排器在边界统一折叠。

use async_trait::async_trait;

use crate::envelope::HookVerdict;
use crate::error::HookError;
use crate::payload::HookPayload;

pub mod local;
pub mod remote;

/// 已解析的 composer handler。解析一次后在整个配置生命周期内复用，
/// 可被并发请求共享。
#[async_trait]
pub trait ComposerHandler: Send + Sync {
    async fn call(&self, payload: &HookPayload) -> Result<HookVerdict, HookError>;
}
