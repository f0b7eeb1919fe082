//! # 远程调用器
//!
//! 将载荷以 JSON POST 到 composer 端点。阻塞模式等待响应并归一化；
//! 非阻塞模式发出请求后立即返回合成 SUCCESS，之后的传输错误只记日志。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::ComposerHandler;
use crate::envelope::{self, HookVerdict};
use crate::error::HookError;
use crate::payload::HookPayload;

/// 基于 HTTPS 的远程 composer handler
pub struct RemoteHandler {
    client: Client,
    endpoint: Url,
    blocking: bool,
}

impl RemoteHandler {
    /// 传输超时在构造时固定到客户端上，阻塞调用隐式受其约束
    pub fn new(endpoint: Url, blocking: bool, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            blocking,
        })
    }
}

#[async_trait]
impl ComposerHandler for RemoteHandler {
    async fn call(&self, payload: &HookPayload) -> Result<HookVerdict, HookError> {
        tracing::debug!(endpoint = %self.endpoint, "invoking remote composer");

        // .json() 立即完成序列化，请求体不再借用载荷
        let request = self.client.post(self.endpoint.clone()).json(payload);

        if !self.blocking {
            let endpoint = self.endpoint.clone();
            tokio::spawn(async move {
                if let Err(err) = request.send().await {
                    tracing::warn!(
                        endpoint = %endpoint,
                        error = %err,
                        "non-blocking remote composer failed"
                    );
                }
            });
            return Ok(HookVerdict::success("Remote function invoked successfully"));
        }

        let response = request.send().await?;
        let ok = response.status().is_success();
        let raw = response.text().await?;

        Ok(envelope::normalize(&raw, ok))
    }
}
