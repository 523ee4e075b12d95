//! LLM客户端 - 基于rig的模型调用实现

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::LLMConfig;
use crate::error::{ConfigError, GenerationError};
use crate::llm::invoker::{GenerationRequest, ModelInvoker, TextStream, accumulate_prefixes};

mod providers;

use providers::{ProviderAgent, ProviderClient};

/// LLM客户端 - 对接真实模型后端的 [`ModelInvoker`]
///
/// 构造时即校验凭证，缺少API KEY时无法创建，流水线也就无从运行。
/// 调用失败不会重试，错误原样交给调用方。
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let api_key = config.effective_api_key()?;
        let client = ProviderClient::new(&config, &api_key)?;

        debug!(
            provider = %config.provider,
            model = config.effective_model(),
            endpoint = config.effective_api_base_url(),
            "LLM client initialised"
        );

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    fn deadline(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn build_agent(&self, request: &GenerationRequest) -> Result<ProviderAgent, GenerationError> {
        self.client.create_agent(
            self.config.effective_model(),
            request.system_instruction(),
            request.temperature(),
            request.max_tokens(),
        )
    }
}

#[async_trait]
impl ModelInvoker for LLMClient {
    async fn invoke_blocking(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        request.validate()?;
        let agent = self.build_agent(request)?;
        let prompt = request.user_prompt(self.config.language_steering);

        debug!(
            mode = "blocking",
            payload_len = prompt.len(),
            temperature = request.temperature(),
            "dispatching generation request"
        );

        let text = tokio::time::timeout(self.deadline(), agent.prompt(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout {
                seconds: self.config.timeout_seconds,
            })??;

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        Ok(text)
    }

    async fn invoke_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, GenerationError> {
        request.validate()?;
        let agent = self.build_agent(request)?;
        let prompt = request.user_prompt(self.config.language_steering);

        debug!(
            mode = "streaming",
            payload_len = prompt.len(),
            temperature = request.temperature(),
            "dispatching generation request"
        );

        // 超时只约束建立流的过程，之后的逐块读取由后端连接自身控制
        let chunks = tokio::time::timeout(self.deadline(), agent.stream_text(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout {
                seconds: self.config.timeout_seconds,
            })?;

        Ok(accumulate_prefixes(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::LLMClient;
    use crate::config::{LLMConfig, LLMProvider};
    use crate::error::ConfigError;

    #[test]
    fn test_client_requires_api_key() {
        // 配置中KEY为空，且环境中也没有OPENAI_API_KEY时才断言
        let config = LLMConfig {
            provider: LLMProvider::OpenAI,
            api_key: String::new(),
            ..Default::default()
        };

        if std::env::var(LLMProvider::OpenAI.api_key_env_var()).is_err() {
            let result = LLMClient::new(config);
            assert!(matches!(
                result,
                Err(ConfigError::MissingApiKey { env_var: "OPENAI_API_KEY", .. })
            ));
        }
    }

    #[test]
    fn test_client_rejects_invalid_temperature_before_key_lookup() {
        let config = LLMConfig {
            api_key: "test-key".to_string(),
            temperature: 2.0,
            ..Default::default()
        };

        assert!(matches!(
            LLMClient::new(config),
            Err(ConfigError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_client_builds_with_explicit_key() {
        let config = LLMConfig {
            provider: LLMProvider::OpenAI,
            api_key: "test-key".to_string(),
            ..Default::default()
        };

        let client = LLMClient::new(config).unwrap();
        assert_eq!(client.config().effective_model(), "gpt-4o-mini");
    }
}
