use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::i18n::OutputLanguage;
use crate::llm::invoker::InvocationMode;

/// 默认配置文件名，存在于工作目录时自动加载
pub const DEFAULT_CONFIG_FILE: &str = "quartet.toml";

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[serde(rename = "gemini")]
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAI,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::Gemini => write!(f, "gemini"),
            LLMProvider::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(LLMProvider::Gemini),
            "openai" => Ok(LLMProvider::OpenAI),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl LLMProvider {
    /// 读取API KEY的环境变量名
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => "GOOGLE_API_KEY",
            LLMProvider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => "gemini-1.5-flash",
            LLMProvider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn default_api_base_url(&self) -> &'static str {
        match self {
            LLMProvider::Gemini => "https://generativelanguage.googleapis.com",
            LLMProvider::OpenAI => "https://api.openai.com/v1",
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// 输出语言
    pub target_language: OutputLanguage,

    /// 模型调用方式（一次性返回 / 增量流式）
    pub invocation_mode: InvocationMode,

    /// 运行结束后是否渲染流水线拓扑图
    pub render_topology: bool,

    /// 拓扑图输出路径，未指定时写入临时文件
    pub topology_output: Option<PathBuf>,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY，为空时从Provider对应的环境变量读取
    pub api_key: String,

    /// LLM API基地址，为空时使用Provider默认地址
    pub api_base_url: String,

    /// 模型名称，为空时使用Provider默认模型
    pub model: String,

    /// 最大输出tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,

    /// 是否在用户提示词末尾附加输出语言指令
    pub language_steering: bool,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 校验配置，任何一次运行前调用
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.llm.validate()
    }
}

impl LLMConfig {
    /// 生效的API KEY：优先使用配置值，否则读取环境变量
    pub fn effective_api_key(&self) -> Result<String, ConfigError> {
        if !self.api_key.trim().is_empty() {
            return Ok(self.api_key.trim().to_string());
        }

        let env_var = self.provider.api_key_env_var();
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey {
                provider: self.provider.to_string(),
                env_var,
            }),
        }
    }

    /// 生效的模型名称
    pub fn effective_model(&self) -> &str {
        if self.model.trim().is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// 生效的API基地址
    pub fn effective_api_base_url(&self) -> &str {
        if self.api_base_url.trim().is_empty() {
            self.provider.default_api_base_url()
        } else {
            &self.api_base_url
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidTemperature(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            target_language: OutputLanguage::default(),
            invocation_mode: InvocationMode::default(),
            render_topology: false,
            topology_output: None,
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: String::new(),
            api_base_url: String::new(),
            model: String::new(),
            max_tokens: 400,
            temperature: 0.5,
            timeout_seconds: 120,
            language_steering: true,
        }
    }
}
