//! # Hook 调用载荷
//!
//! 由调用方按请求构造，对引擎只读，原样传递给 composer。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 请求执行上下文的快照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayloadContext {
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub params: JsonValue,
    #[serde(default)]
    pub request: JsonValue,
    #[serde(default)]
    pub body: JsonValue,
    #[serde(default)]
    pub secrets: JsonValue,
}

/// Hook 调用载荷
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub context: PayloadContext,
    #[serde(default)]
    pub document: JsonValue,
}

impl HookPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header<T: Into<String>, U: Into<String>>(mut self, key: T, value: U) -> Self {
        self.context.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.context.body = body;
        self
    }

    pub fn with_document(mut self, document: JsonValue) -> Self {
        self.document = document;
        self
    }
}
