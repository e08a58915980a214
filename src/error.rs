//! 错误类型定义
//! Error taxonomy for the behavior sentinel

use thiserror::Error;

/// 配置加载/校验错误 (加载时拒绝,不会延迟到评估阶段)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// 单条检测无效 (只丢弃该条,帧内其余检测继续处理)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("missing or empty label")]
    MissingLabel,

    #[error("confidence {0} outside [0, 1]")]
    InvalidConfidence(f32),

    #[error("invalid bbox {0:?}")]
    InvalidBbox(Vec<f64>),

    #[error("malformed detection record: {0}")]
    Malformed(String),
}

/// 告警投递失败 (仅记录日志,不传递给帧调用方,不重试)
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no webhook endpoint configured")]
    NoEndpoint,

    #[error("endpoint responded with HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to serialize alert: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<ureq::Error> for DispatchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => DispatchError::Status(code),
            ureq::Error::Transport(t) => DispatchError::Transport(t.to_string()),
        }
    }
}
