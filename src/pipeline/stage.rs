use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineInput;

/// 流水线中的四个固定角色，按执行顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Stage {
    Ceo,
    Researcher,
    Coder,
    Critic,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Stage {
    /// 执行顺序
    pub const ALL: [Stage; 4] = [Stage::Ceo, Stage::Researcher, Stage::Coder, Stage::Critic];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Ceo => "CEO",
            Stage::Researcher => "Researcher",
            Stage::Coder => "Coder",
            Stage::Critic => "Critic",
        }
    }

    /// 在执行顺序中的位置，从0开始
    pub fn position(&self) -> usize {
        match self {
            Stage::Ceo => 0,
            Stage::Researcher => 1,
            Stage::Coder => 2,
            Stage::Critic => 3,
        }
    }

    /// 下一个阶段，Critic之后为None
    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.position() + 1).copied()
    }

    /// 角色的系统提示词
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Stage::Ceo => "You are CEO Agent. Generate concise product ideas.",
            Stage::Researcher => "You are Research Agent. Provide background and competitors.",
            Stage::Coder => "You are Coder Agent. Suggest an implementation approach.",
            Stage::Critic => "You are Critic Agent. Analyze risks and flaws.",
        }
    }

    /// 构造本阶段的用户提示词
    ///
    /// `upstream` 按执行顺序存放此前各阶段的完整输出。
    pub fn payload(&self, input: &PipelineInput, upstream: &[String]) -> String {
        let upstream_text = |stage: Stage| {
            upstream
                .get(stage.position())
                .map(String::as_str)
                .unwrap_or_default()
        };

        match self {
            Stage::Ceo => format!(
                "Problem: {}\nConstraints: {}",
                input.problem, input.constraints
            ),
            Stage::Researcher => format!("Idea to research: {}", upstream_text(Stage::Ceo)),
            Stage::Coder => format!(
                "Idea: {}\nResearch: {}",
                upstream_text(Stage::Ceo),
                upstream_text(Stage::Researcher)
            ),
            Stage::Critic => format!(
                "Idea: {}\nResearch: {}\nCode Plan: {}",
                upstream_text(Stage::Ceo),
                upstream_text(Stage::Researcher),
                upstream_text(Stage::Coder)
            ),
        }
    }
}
