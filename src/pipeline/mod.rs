// 四角色流水线
// CEO        = 问题 + 约束           -> 产品创意
// Researcher = CEO                   -> 背景与竞品
// Coder      = CEO + Researcher      -> 实现方案
// Critic     = CEO + Researcher + Coder -> 风险与缺陷

use serde::{Deserialize, Serialize};

use crate::i18n::OutputLanguage;

pub mod observer;
pub mod orchestrator;
pub mod session;
pub mod stage;

pub use observer::{NoopObserver, RunState, StageObserver};
pub use orchestrator::PipelineOrchestrator;
pub use session::SessionLabel;
pub use stage::Stage;

/// 一次运行的输入，对应前端表单
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineInput {
    pub problem: String,
    pub constraints: String,
    pub language: OutputLanguage,
    pub temperature: f64,
}

impl PipelineInput {
    pub fn new(problem: impl Into<String>, constraints: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            constraints: constraints.into(),
            language: OutputLanguage::default(),
            temperature: 0.5,
        }
    }

    pub fn with_language(mut self, language: OutputLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// 问题为空或只有空白时不运行任何阶段
    pub fn is_blank(&self) -> bool {
        self.problem.trim().is_empty()
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineBundle {
    pub ceo_text: String,
    pub research_text: String,
    pub coder_text: String,
    pub critic_text: String,
    /// 空输入短路时为None
    pub session_label: Option<SessionLabel>,
}

impl PipelineBundle {
    /// 空输入时返回的全空结果
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.session_label.is_none()
            && self.ceo_text.is_empty()
            && self.research_text.is_empty()
            && self.coder_text.is_empty()
            && self.critic_text.is_empty()
    }

    /// 按阶段取文本
    pub fn text(&self, stage: Stage) -> &str {
        match stage {
            Stage::Ceo => &self.ceo_text,
            Stage::Researcher => &self.research_text,
            Stage::Coder => &self.coder_text,
            Stage::Critic => &self.critic_text,
        }
    }

    /// 稳定的五元组形式：(ceo, research, coder, critic, session_label)
    pub fn into_tuple(self) -> (String, String, String, String, String) {
        let label = self
            .session_label
            .map(|label| label.as_str().to_string())
            .unwrap_or_default();
        (
            self.ceo_text,
            self.research_text,
            self.coder_text,
            self.critic_text,
            label,
        )
    }
}
