//! 模型调用能力抽象
//!
//! [`ModelInvoker`] 把一次模型调用抽象成两种互为替代的方式：
//! [`ModelInvoker::invoke_blocking`] 一次性返回完整文本，
//! [`ModelInvoker::invoke_streaming`] 返回一个由不断变长的文本前缀组成的流，
//! 最后一个元素即完整文本。调用方通过 [`InvocationMode`] 选择其一。

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::i18n::OutputLanguage;

/// 增量模式下的文本前缀流
pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

/// 模型调用方式
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    /// 等待完整文本
    #[default]
    Blocking,
    /// 逐步产出文本前缀
    Streaming,
}

impl std::fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationMode::Blocking => write!(f, "blocking"),
            InvocationMode::Streaming => write!(f, "streaming"),
        }
    }
}

/// 单次模型调用的请求，构造后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    system_instruction: String,
    user_payload: String,
    output_language: Option<OutputLanguage>,
    temperature: f64,
    max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(system_instruction: impl Into<String>, user_payload: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_payload: user_payload.into(),
            output_language: None,
            temperature: 0.5,
            max_tokens: 400,
        }
    }

    pub fn with_language(mut self, language: Option<OutputLanguage>) -> Self {
        self.output_language = language;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_payload(&self) -> &str {
        &self.user_payload
    }

    pub fn output_language(&self) -> Option<OutputLanguage> {
        self.output_language
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// 发送前的本地校验
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(GenerationError::InvalidRequest(format!(
                "temperature {} is outside [0, 1]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(GenerationError::InvalidRequest(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 实际发送给后端的用户提示词
    ///
    /// 开启语言引导且请求带有输出语言时，在末尾追加 `Respond in <Language>.`；
    /// 否则原样发送，语言选择成为空操作。
    pub fn user_prompt(&self, language_steering: bool) -> String {
        match self.output_language {
            Some(language) if language_steering => {
                format!("{}\n\n{}", self.user_payload, language.prompt_instruction())
            }
            _ => self.user_payload.clone(),
        }
    }
}

/// 模型调用能力
///
/// 实现不得在内部重试，也不得保留跨调用的状态。
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// 一次性返回完整文本
    async fn invoke_blocking(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// 返回文本前缀流，调用方需要消费到最后一个元素才能拿到完整文本
    async fn invoke_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, GenerationError>;
}

/// 把后端逐段返回的文本块累积成不断变长的前缀流
///
/// 空文本块会被跳过；块流出错时产出该错误并结束；
/// 块流正常结束但从未产出任何文本时，产出 [`GenerationError::EmptyContent`]。
pub fn accumulate_prefixes<S>(chunks: S) -> TextStream
where
    S: Stream<Item = Result<String, GenerationError>> + Send + 'static,
{
    let state = (Box::pin(chunks), String::new(), false);

    stream::unfold(state, |(mut chunks, mut text, finished)| async move {
        if finished {
            return None;
        }

        loop {
            match chunks.next().await {
                Some(Ok(chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    text.push_str(&chunk);
                    let prefix = text.clone();
                    return Some((Ok(prefix), (chunks, text, false)));
                }
                Some(Err(err)) => return Some((Err(err), (chunks, text, true))),
                None if text.is_empty() => {
                    return Some((Err(GenerationError::EmptyContent), (chunks, text, true)));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

/// 消费前缀流直到结束，返回最后一个前缀
///
/// 每个中间前缀都会交给 `on_prefix`，仅用于展示。
pub async fn drain<F>(mut prefixes: TextStream, mut on_prefix: F) -> Result<String, GenerationError>
where
    F: FnMut(&str),
{
    let mut last = String::new();
    while let Some(prefix) = prefixes.next().await {
        let prefix = prefix?;
        on_prefix(&prefix);
        last = prefix;
    }

    if last.trim().is_empty() {
        return Err(GenerationError::EmptyContent);
    }
    Ok(last)
}
