//! 错误类型
//!
//! - [`ConfigError`]：启动阶段的配置/凭证错误，出现时流水线无法构建。
//! - [`GenerationError`]：单次模型调用失败，原样向上传播，不做重试。
//! - [`PipelineError`]：某个阶段失败导致整次运行失败，不返回部分结果。

use thiserror::Error;

use crate::pipeline::stage::Stage;

/// 配置错误，在任何一次运行之前触发
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key for provider '{provider}': set {env_var} or pass --llm-api-key")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    #[error("temperature must be within [0, 1], got {0}")]
    InvalidTemperature(f64),

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("failed to initialise LLM provider: {0}")]
    Provider(String),

    #[error("failed to load config file {path}: {message}")]
    File { path: String, message: String },
}

/// 模型调用错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    /// 请求在发出前就被判定为非法（温度越界、max_tokens为0等）
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),

    /// 后端不可达或拒绝了请求（配额、参数、负载过大）
    #[error("model backend error: {0}")]
    Backend(String),

    /// 后端在流结束后没有返回任何内容
    #[error("model backend returned no content")]
    EmptyContent,

    #[error("model backend did not respond within {seconds}s")]
    Timeout { seconds: u64 },
}

/// 流水线运行错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    /// 失败的阶段
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Stage { stage, .. } => *stage,
        }
    }

    /// 底层的模型调用错误
    pub fn generation_error(&self) -> &GenerationError {
        match self {
            PipelineError::Stage { source, .. } => source,
        }
    }
}
