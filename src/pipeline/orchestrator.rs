use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ConfigError, GenerationError, PipelineError};
use crate::llm::LLMClient;
use crate::llm::invoker::{GenerationRequest, InvocationMode, ModelInvoker, drain};
use crate::pipeline::observer::{NoopObserver, RunState, StageObserver};
use crate::pipeline::session::SessionLabel;
use crate::pipeline::stage::Stage;
use crate::pipeline::{PipelineBundle, PipelineInput};

/// 流水线编排器
///
/// 严格按 CEO → Researcher → Coder → Critic 的顺序调用模型，每个阶段的完整输出
/// 作为后续阶段的输入。编排器本身不持有跨运行的可变状态，可以放在 `Arc` 里被
/// 多个并发运行共享。
#[derive(Clone)]
pub struct PipelineOrchestrator {
    invoker: Arc<dyn ModelInvoker>,
    mode: InvocationMode,
    max_tokens: u32,
}

impl PipelineOrchestrator {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            invoker,
            mode: InvocationMode::default(),
            max_tokens: 400,
        }
    }

    /// 基于配置创建真实后端的编排器，凭证缺失时直接失败
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let client = LLMClient::new(config.llm.clone())?;
        Ok(Self::new(Arc::new(client))
            .with_mode(config.invocation_mode)
            .with_max_tokens(config.llm.max_tokens))
    }

    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn mode(&self) -> InvocationMode {
        self.mode
    }

    /// 执行一次完整运行
    pub async fn run(&self, input: &PipelineInput) -> Result<PipelineBundle, PipelineError> {
        self.run_observed(input, &NoopObserver).await
    }

    /// 执行一次完整运行，并把状态变化与中间输出通知给观察者
    pub async fn run_observed(
        &self,
        input: &PipelineInput,
        observer: &dyn StageObserver,
    ) -> Result<PipelineBundle, PipelineError> {
        if input.is_blank() {
            info!("problem statement is empty, skipping pipeline run");
            return Ok(PipelineBundle::empty());
        }

        let mut state = RunState::Idle;
        let mut outputs: Vec<String> = Vec::with_capacity(Stage::ALL.len());

        for stage in Stage::ALL {
            state = state.advance();
            observer.on_state_change(state);

            let request = GenerationRequest::new(
                stage.system_instruction(),
                stage.payload(input, &outputs),
            )
            .with_language(Some(input.language))
            .with_temperature(input.temperature)
            .with_max_tokens(self.max_tokens);

            debug!(%stage, mode = %self.mode, "stage started");

            match self.invoke_stage(stage, &request, observer).await {
                Ok(text) => {
                    debug!(%stage, output_len = text.len(), "stage completed");
                    observer.on_stage_completed(stage, &text);
                    outputs.push(text);
                }
                Err(source) => {
                    state = state.fail();
                    observer.on_state_change(state);
                    warn!(%stage, error = %source, "stage failed, aborting run");
                    return Err(PipelineError::Stage { stage, source });
                }
            }
        }

        state = state.advance();
        observer.on_state_change(state);

        let session_label = SessionLabel::generate();
        info!(session = %session_label, "pipeline run finished");

        let mut outputs = outputs.into_iter();
        Ok(PipelineBundle {
            ceo_text: outputs.next().unwrap_or_default(),
            research_text: outputs.next().unwrap_or_default(),
            coder_text: outputs.next().unwrap_or_default(),
            critic_text: outputs.next().unwrap_or_default(),
            session_label: Some(session_label),
        })
    }

    /// 调用单个阶段，返回该阶段的完整文本
    ///
    /// 增量模式下中间前缀只交给观察者，返回值始终是流的最后一个元素。
    async fn invoke_stage(
        &self,
        stage: Stage,
        request: &GenerationRequest,
        observer: &dyn StageObserver,
    ) -> Result<String, GenerationError> {
        match self.mode {
            InvocationMode::Blocking => {
                let text = self.invoker.invoke_blocking(request).await?;
                if text.trim().is_empty() {
                    return Err(GenerationError::EmptyContent);
                }
                Ok(text)
            }
            InvocationMode::Streaming => {
                let prefixes = self.invoker.invoke_streaming(request).await?;
                drain(prefixes, |prefix| observer.on_progress(stage, prefix)).await
            }
        }
    }
}
