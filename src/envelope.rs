//! # 响应信封与归一化
//!
//! 将 composer 的任意输出（字符串、对象、错误）归一化为统一的判定结果。
//! 线上形态是 `{status, message, data?}`，status 仅在序列化边界做大小写不敏感
//! 比较；引擎内部使用封闭的两变体类型 [`HookVerdict`]。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 错误路径上原始输入为空时使用的兜底消息
pub const FALLBACK_ERROR_MESSAGE: &str = "Unable to parse composer response";

/// 线上信封形态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ResponseEnvelope {
    /// status 只与 "SUCCESS" 做大小写不敏感比较
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("SUCCESS")
    }
}

/// 归一化后的判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum HookVerdict {
    Success {
        message: String,
        data: Option<JsonValue>,
    },
    Error {
        message: String,
    },
}

impl HookVerdict {
    pub fn success<T: Into<String>>(message: T) -> Self {
        HookVerdict::Success {
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HookVerdict::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            HookVerdict::Success { message, .. } => message,
            HookVerdict::Error { message } => message,
        }
    }

    /// 提取可回写进请求上下文的增量（目前仅 headers）
    pub fn context_delta(&self) -> Option<ContextDelta> {
        match self {
            HookVerdict::Success {
                data: Some(data), ..
            } => ContextDelta::from_data(data),
            _ => None,
        }
    }
}

impl From<ResponseEnvelope> for HookVerdict {
    fn from(envelope: ResponseEnvelope) -> Self {
        if envelope.is_success() {
            HookVerdict::Success {
                message: envelope.message,
                data: envelope.data,
            }
        } else {
            let message = if envelope.message.is_empty() {
                FALLBACK_ERROR_MESSAGE.to_string()
            } else {
                envelope.message
            };
            HookVerdict::Error { message }
        }
    }
}

impl From<HookVerdict> for ResponseEnvelope {
    fn from(verdict: HookVerdict) -> Self {
        match verdict {
            HookVerdict::Success { message, data } => ResponseEnvelope {
                status: "SUCCESS".to_string(),
                message,
                data,
            },
            HookVerdict::Error { message } => ResponseEnvelope {
                status: "ERROR".to_string(),
                message,
                data: None,
            },
        }
    }
}

/// Hook 可以贡献回请求上下文的增量。新 header 覆盖同名旧值，合并由调用方完成。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextDelta {
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl ContextDelta {
    /// 从信封的 data 字段提取增量；data 中没有可更新字段时返回 None
    pub fn from_data(data: &JsonValue) -> Option<Self> {
        let headers = data.get("headers")?.as_object()?;
        let headers: HashMap<String, String> = headers
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect();
        if headers.is_empty() {
            return None;
        }
        Some(Self { headers })
    }
}

/// 归一化原始文本响应。全函数，不会失败：
/// 带 status 字段的 JSON 对象原样通过，其余按 ok_hint 合成信封。
pub fn normalize(raw: &str, ok_hint: bool) -> HookVerdict {
    if let Ok(value) = serde_json::from_str::<JsonValue>(raw) {
        if value.get("status").is_some() {
            return envelope_verdict(value, raw, ok_hint);
        }
    }
    synthesize(raw, ok_hint)
}

/// 归一化本地 composer 返回的结构化值，规则与 [`normalize`] 一致
pub fn normalize_value(value: &JsonValue, ok_hint: bool) -> HookVerdict {
    if value.get("status").is_some() {
        return envelope_verdict(value.clone(), &value.to_string(), ok_hint);
    }
    let message = match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    };
    synthesize(&message, ok_hint)
}

fn envelope_verdict(value: JsonValue, raw: &str, ok_hint: bool) -> HookVerdict {
    match serde_json::from_value::<ResponseEnvelope>(value) {
        Ok(envelope) => envelope.into(),
        // status 字段存在但形态不合法，回退到合成路径
        Err(_) => synthesize(raw, ok_hint),
    }
}

fn synthesize(message: &str, ok_hint: bool) -> HookVerdict {
    if ok_hint {
        HookVerdict::Success {
            message: message.to_string(),
            data: None,
        }
    } else {
        let message = if message.is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message.to_string()
        };
        HookVerdict::Error { message }
    }
}
