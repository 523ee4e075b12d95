use std::sync::{Arc, Mutex};

use agent_quartet::config::{Config, LLMProvider};
use agent_quartet::error::{ConfigError, GenerationError};
use agent_quartet::i18n::OutputLanguage;
use agent_quartet::llm::invoker::{
    GenerationRequest, InvocationMode, ModelInvoker, TextStream, accumulate_prefixes,
};
use agent_quartet::pipeline::{PipelineInput, PipelineOrchestrator, Stage};
use agent_quartet::workflow::{launch, run_with};
use async_trait::async_trait;
use futures::stream;
use tempfile::TempDir;

/// 按阶段返回固定文本的模型桩
struct FixedInvoker {
    calls: Mutex<Vec<String>>,
}

impl FixedInvoker {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    fn reply(&self, request: &GenerationRequest) -> String {
        self.calls
            .lock()
            .unwrap()
            .push(request.system_instruction().to_string());

        let stage = Stage::ALL
            .into_iter()
            .find(|s| s.system_instruction() == request.system_instruction());
        let text = match stage {
            Some(Stage::Ceo) => "IDEA-A",
            Some(Stage::Researcher) => "RESEARCH-A",
            Some(Stage::Coder) => "CODE-A",
            Some(Stage::Critic) => "CRITIC-A",
            None => "",
        };
        text.to_string()
    }
}

#[async_trait]
impl ModelInvoker for FixedInvoker {
    async fn invoke_blocking(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        Ok(self.reply(request))
    }

    async fn invoke_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, GenerationError> {
        let text = self.reply(request);
        let (head, tail) = text.split_at(text.len() / 2);
        Ok(accumulate_prefixes(stream::iter(vec![
            Ok(head.to_string()),
            Ok(tail.to_string()),
        ])))
    }
}

fn food_waste_input() -> PipelineInput {
    PipelineInput::new("Reduce food waste in restaurants", "Budget < $5000")
        .with_language(OutputLanguage::English)
        .with_temperature(0.5)
}

#[tokio::test]
async fn test_food_waste_scenario_returns_stage_outputs_and_label() {
    for mode in [InvocationMode::Blocking, InvocationMode::Streaming] {
        let invoker = Arc::new(FixedInvoker::new());
        let orchestrator = PipelineOrchestrator::new(invoker.clone()).with_mode(mode);

        let bundle = orchestrator.run(&food_waste_input()).await.unwrap();
        let (ceo, research, coder, critic, label) = bundle.into_tuple();

        assert_eq!(
            (ceo.as_str(), research.as_str(), coder.as_str(), critic.as_str()),
            ("IDEA-A", "RESEARCH-A", "CODE-A", "CRITIC-A")
        );
        assert_eq!(label.len(), 8);
        assert_eq!(invoker.calls.lock().unwrap().len(), 4);
    }
}

#[tokio::test]
async fn test_run_with_renders_topology_to_requested_path() {
    let temp_dir = TempDir::new().unwrap();
    let graph_path = temp_dir.path().join("workflow.svg");
    let config = Config {
        render_topology: true,
        topology_output: Some(graph_path.clone()),
        ..Default::default()
    };
    let orchestrator = PipelineOrchestrator::new(Arc::new(FixedInvoker::new()));

    let outcome = run_with(&orchestrator, &config, &food_waste_input())
        .await
        .unwrap();

    assert_eq!(outcome.topology_path, Some(graph_path.clone()));
    assert_eq!(outcome.bundle.critic_text, "CRITIC-A");
    let svg = std::fs::read_to_string(&graph_path).unwrap();
    for label in ["Problem", "CEO", "Researcher", "Coder", "Critic"] {
        assert!(svg.contains(label));
    }
}

#[tokio::test]
async fn test_run_with_blank_problem_skips_agents_and_graph() {
    let invoker = Arc::new(FixedInvoker::new());
    let orchestrator = PipelineOrchestrator::new(invoker.clone());

    let temp_dir = TempDir::new().unwrap();
    let graph_path = temp_dir.path().join("workflow.svg");
    let config = Config {
        render_topology: true,
        topology_output: Some(graph_path.clone()),
        ..Default::default()
    };

    let outcome = run_with(&orchestrator, &config, &PipelineInput::new("  ", ""))
        .await
        .unwrap();

    assert!(outcome.bundle.is_empty());
    assert!(outcome.topology_path.is_none());
    assert!(!graph_path.exists());
    assert!(invoker.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_launch_without_credentials_fails_before_any_run() {
    if std::env::var(LLMProvider::OpenAI.api_key_env_var()).is_ok() {
        return;
    }

    let mut config = Config::default();
    config.llm.provider = LLMProvider::OpenAI;
    config.llm.api_key = String::new();

    let err = launch(&config, &food_waste_input()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::MissingApiKey { .. })
    ));
}

#[test]
fn test_orchestrator_from_config_requires_credentials() {
    if std::env::var(LLMProvider::OpenAI.api_key_env_var()).is_ok() {
        return;
    }

    let mut config = Config::default();
    config.llm.provider = LLMProvider::OpenAI;

    assert!(matches!(
        PipelineOrchestrator::from_config(&config),
        Err(ConfigError::MissingApiKey { .. })
    ));
}
