use serde::{Deserialize, Serialize};

/// 输出语言
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLanguage {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
}

impl std::fmt::Display for OutputLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for OutputLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(OutputLanguage::English),
            "hi" | "hindi" | "हिन्दी" => Ok(OutputLanguage::Hindi),
            "mr" | "marathi" | "मराठी" => Ok(OutputLanguage::Marathi),
            "es" | "spanish" | "español" => Ok(OutputLanguage::Spanish),
            "fr" | "french" | "français" => Ok(OutputLanguage::French),
            "de" | "german" | "deutsch" => Ok(OutputLanguage::German),
            "zh" | "chinese" | "中文" => Ok(OutputLanguage::Chinese),
            "ja" | "japanese" | "日本語" => Ok(OutputLanguage::Japanese),
            _ => Err(format!("Unknown output language: {}", s)),
        }
    }
}

impl OutputLanguage {
    /// 表单下拉框中的全部可选语言
    pub const ALL: [OutputLanguage; 8] = [
        OutputLanguage::English,
        OutputLanguage::Hindi,
        OutputLanguage::Marathi,
        OutputLanguage::Spanish,
        OutputLanguage::French,
        OutputLanguage::German,
        OutputLanguage::Chinese,
        OutputLanguage::Japanese,
    ];

    /// 语言的英文名称，直接用于提示词
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputLanguage::English => "English",
            OutputLanguage::Hindi => "Hindi",
            OutputLanguage::Marathi => "Marathi",
            OutputLanguage::Spanish => "Spanish",
            OutputLanguage::French => "French",
            OutputLanguage::German => "German",
            OutputLanguage::Chinese => "Chinese",
            OutputLanguage::Japanese => "Japanese",
        }
    }

    /// 语言的本地名称
    pub fn native_name(&self) -> &'static str {
        match self {
            OutputLanguage::English => "English",
            OutputLanguage::Hindi => "हिन्दी",
            OutputLanguage::Marathi => "मराठी",
            OutputLanguage::Spanish => "Español",
            OutputLanguage::French => "Français",
            OutputLanguage::German => "Deutsch",
            OutputLanguage::Chinese => "中文",
            OutputLanguage::Japanese => "日本語",
        }
    }

    /// 附加在用户提示词末尾的语言指令
    pub fn prompt_instruction(&self) -> String {
        format!("Respond in {}.", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::OutputLanguage;

    #[test]
    fn test_output_language_default() {
        assert_eq!(OutputLanguage::default(), OutputLanguage::English);
    }

    #[test]
    fn test_output_language_from_str() {
        assert_eq!("English".parse::<OutputLanguage>().unwrap(), OutputLanguage::English);
        assert_eq!("hi".parse::<OutputLanguage>().unwrap(), OutputLanguage::Hindi);
        assert_eq!("MARATHI".parse::<OutputLanguage>().unwrap(), OutputLanguage::Marathi);
        assert_eq!("español".parse::<OutputLanguage>().unwrap(), OutputLanguage::Spanish);
        assert_eq!(" fr ".parse::<OutputLanguage>().unwrap(), OutputLanguage::French);
        assert_eq!("中文".parse::<OutputLanguage>().unwrap(), OutputLanguage::Chinese);
        assert!("klingon".parse::<OutputLanguage>().is_err());
    }

    #[test]
    fn test_every_language_round_trips_through_display_name() {
        for language in OutputLanguage::ALL {
            assert_eq!(
                language.display_name().parse::<OutputLanguage>().unwrap(),
                language
            );
        }
    }

    #[test]
    fn test_prompt_instruction() {
        assert_eq!(OutputLanguage::German.prompt_instruction(), "Respond in German.");
        assert_eq!(OutputLanguage::Japanese.to_string(), "Japanese");
    }
}
