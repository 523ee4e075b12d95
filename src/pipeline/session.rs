use uuid::Uuid;

/// 会话标签的长度（十六进制字符数）
pub const SESSION_LABEL_LEN: usize = 8;

/// 一次运行的展示用标签
///
/// 取随机UUID v4的前8个十六进制字符，不落盘，也不应当作主键使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionLabel(String);

impl SessionLabel {
    pub fn generate() -> Self {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(SESSION_LABEL_LEN);
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 前端展示形式，例如 `Session-1a2b3c4d`
    pub fn display_tag(&self) -> String {
        format!("Session-{}", self.0)
    }
}

impl std::fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
