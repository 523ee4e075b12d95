//! LLM Provider支持模块

use futures::stream::{BoxStream, Stream, StreamExt};
use rig::{
    agent::{Agent, MultiTurnStreamItem},
    client::CompletionClient,
    completion::Prompt,
    providers::gemini::completion::gemini_api_types::{AdditionalParameters, GenerationConfig},
    streaming::{StreamedAssistantContent, StreamingPrompt},
};

use crate::config::{LLMConfig, LLMProvider};
use crate::error::{ConfigError, GenerationError};

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    Gemini(rig::providers::gemini::Client),
    OpenAI(rig::providers::openai::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    pub fn new(config: &LLMConfig, api_key: &str) -> Result<Self, ConfigError> {
        match config.provider {
            LLMProvider::Gemini => {
                let client = rig::providers::gemini::Client::builder(api_key)
                    .build()
                    .map_err(|e| ConfigError::Provider(e.to_string()))?;
                Ok(ProviderClient::Gemini(client))
            }
            LLMProvider::OpenAI => {
                let client = rig::providers::openai::Client::builder(api_key)
                    .base_url(config.effective_api_base_url())
                    .build();
                Ok(ProviderClient::OpenAI(client))
            }
        }
    }

    /// 创建Agent，每次调用都使用请求自带的温度与输出长度
    pub fn create_agent(
        &self,
        model: &str,
        system_prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<ProviderAgent, GenerationError> {
        match self {
            ProviderClient::Gemini(client) => {
                let gen_cfg = GenerationConfig::default();
                let cfg = AdditionalParameters::default().with_config(gen_cfg);
                let params = serde_json::to_value(cfg)
                    .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;

                let agent = client
                    .agent(model)
                    .preamble(system_prompt)
                    .max_tokens(max_tokens.into())
                    .temperature(temperature)
                    .additional_params(params)
                    .build();
                Ok(ProviderAgent::Gemini(agent))
            }
            ProviderClient::OpenAI(client) => {
                let agent = client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(system_prompt)
                    .max_tokens(max_tokens.into())
                    .temperature(temperature)
                    .build();
                Ok(ProviderAgent::OpenAI(agent))
            }
        }
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    Gemini(Agent<rig::providers::gemini::completion::CompletionModel>),
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
}

impl ProviderAgent {
    /// 执行prompt，等待完整回复
    pub async fn prompt(&self, prompt: &str) -> Result<String, GenerationError> {
        let result = match self {
            ProviderAgent::Gemini(agent) => agent.prompt(prompt).await,
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
        };
        result.map_err(|e| GenerationError::Backend(e.to_string()))
    }

    /// 以流式方式执行prompt，返回后端逐段产出的文本块
    pub async fn stream_text(&self, prompt: &str) -> BoxStream<'static, Result<String, GenerationError>> {
        match self {
            ProviderAgent::Gemini(agent) => text_chunks(agent.stream_prompt(prompt).await).boxed(),
            ProviderAgent::OpenAI(agent) => text_chunks(agent.stream_prompt(prompt).await).boxed(),
        }
    }
}

/// 只保留助手回复中的文本块，其余流事件（最终响应、推理过程等）忽略
fn text_chunks<S, R, E>(stream: S) -> impl Stream<Item = Result<String, GenerationError>> + Send + 'static
where
    S: Stream<Item = Result<MultiTurnStreamItem<R>, E>> + Send + 'static,
    R: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    stream.filter_map(|item| async move {
        match item {
            Ok(MultiTurnStreamItem::StreamItem(StreamedAssistantContent::Text(text))) => {
                Some(Ok(text.text))
            }
            Ok(_) => None,
            Err(e) => Some(Err(GenerationError::Backend(e.to_string()))),
        }
    })
}
