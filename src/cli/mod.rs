use crate::config::{Config, DEFAULT_CONFIG_FILE, LLMProvider};
use crate::error::ConfigError;
use crate::i18n::OutputLanguage;
use crate::llm::invoker::InvocationMode;
use crate::pipeline::PipelineInput;
use clap::Parser;
use std::path::PathBuf;

/// agent-quartet - CEO、Researcher、Coder、Critic四个智能体协作求解问题
#[derive(Parser, Debug)]
#[command(name = "agent-quartet")]
#[command(
    about = "Multi-agent problem solver: a CEO, a Researcher, a Coder and a Critic agent work through your problem statement one after another."
)]
#[command(version)]
pub struct Args {
    /// 问题描述
    #[arg(short, long, default_value = "")]
    pub problem: String,

    /// 约束条件，例如 "Budget < $5000"
    #[arg(short, long, default_value = "")]
    pub constraints: String,

    /// 输出语言 (English, Hindi, Marathi, Spanish, French, German, Chinese, Japanese)
    #[arg(short, long)]
    pub language: Option<String>,

    /// 创造性（温度参数，0到1之间）
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// 以流式方式调用模型，实时显示输出
    #[arg(long)]
    pub stream: bool,

    /// 运行结束后渲染流水线拓扑图
    #[arg(long)]
    pub graph: bool,

    /// 拓扑图输出路径（隐含 --graph）
    #[arg(long)]
    pub graph_output: Option<PathBuf>,

    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// LLM Provider (gemini, openai)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// 最大输出tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 不在提示词中附加输出语言指令
    #[arg(long)]
    pub no_language_steering: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(&self) -> Result<Config, ConfigError> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须能读取
            Config::from_file(config_path)?
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(DEFAULT_CONFIG_FILE);

            if default_config_path.exists() {
                Config::from_file(&default_config_path)?
            } else {
                Config::default()
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用 {}",
                    provider_str, config.llm.provider
                );
            }
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(llm_api_key) = &self.llm_api_key {
            config.llm.api_key = llm_api_key.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }
        if self.no_language_steering {
            config.llm.language_steering = false;
        }

        // 输出语言
        if let Some(language_str) = &self.language {
            if let Ok(language) = language_str.parse::<OutputLanguage>() {
                config.target_language = language;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的输出语言: {}，使用 {}",
                    language_str, config.target_language
                );
            }
        }

        if self.stream {
            config.invocation_mode = InvocationMode::Streaming;
        }
        if self.graph || self.graph_output.is_some() {
            config.render_topology = true;
        }
        if let Some(graph_output) = &self.graph_output {
            config.topology_output = Some(graph_output.clone());
        }
        config.verbose = config.verbose || self.verbose;

        config.validate()?;
        Ok(config)
    }

    /// 由表单字段与生效配置组成一次运行的输入
    pub fn pipeline_input(&self, config: &Config) -> PipelineInput {
        PipelineInput::new(self.problem.clone(), self.constraints.clone())
            .with_language(config.target_language)
            .with_temperature(config.llm.temperature)
    }
}
