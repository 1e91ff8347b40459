//! 配置管理
//!
//! 提供聊天流核心的行为参数，以及 TOML 配置文件的加载和保存。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析错误
    #[error("TOML 解析错误: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化错误
    #[error("TOML 序列化错误: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 配置目录不可用
    #[error("配置目录不可用")]
    NoConfigDir,
}

/// 聊天流配置
///
/// 控制一次对话回合的传输与解码行为。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// 聊天服务地址
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer 凭证
    #[serde(default)]
    pub api_key: Option<String>,

    /// 界面语言标签（en / sw / ki）
    #[serde(default = "default_language")]
    pub language: String,

    /// 整体超时时间（毫秒）
    ///
    /// 一次流式回合的最大等待时间。
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// chunk 超时时间（毫秒）
    ///
    /// 两个 chunk 之间的最大等待时间。
    #[serde(default = "default_chunk_timeout_ms")]
    pub chunk_timeout_ms: u64,

    /// 恢复回注上限
    ///
    /// 同一回合内损坏载荷允许回注缓冲区的最大次数，
    /// 超过后按帧结构损坏终止，避免无界循环。
    #[serde(default = "default_max_recovery_retries")]
    pub max_recovery_retries: u32,
}

fn default_base_url() -> String {
    "https://api.agricast.app/functions/v1/agricultural-chat".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout_ms() -> u64 {
    300_000 // 5 分钟
}

fn default_chunk_timeout_ms() -> u64 {
    30_000 // 30 秒
}

fn default_max_recovery_retries() -> u32 {
    32
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            language: default_language(),
            timeout_ms: default_timeout_ms(),
            chunk_timeout_ms: default_chunk_timeout_ms(),
            max_recovery_retries: default_max_recovery_retries(),
        }
    }
}

impl ChatConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置服务地址
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 设置凭证
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// 设置语言标签
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// 设置整体超时时间
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// 设置 chunk 超时时间
    pub fn with_chunk_timeout_ms(mut self, chunk_timeout_ms: u64) -> Self {
        self.chunk_timeout_ms = chunk_timeout_ms;
        self
    }

    /// 设置恢复回注上限
    pub fn with_max_recovery_retries(mut self, retries: u32) -> Self {
        self.max_recovery_retries = retries;
        self
    }

    /// 获取整体超时 Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 获取 chunk 超时 Duration
    pub fn chunk_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }

    /// 默认配置文件路径
    ///
    /// 位于平台配置目录下的 `agricast/config.toml`。
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("agricast").join("config.toml"))
    }

    /// 从 TOML 文件加载配置
    ///
    /// 文件不存在时返回默认配置。
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// 保存配置到 TOML 文件
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ============================================================================
// 测试模块
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.timeout_ms, 300_000);
        assert_eq!(config.chunk_timeout_ms, 30_000);
        assert_eq!(config.max_recovery_retries, 32);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ChatConfig::new()
            .with_base_url("https://example.com/chat")
            .with_api_key("test-key")
            .with_language("sw")
            .with_timeout_ms(60_000)
            .with_max_recovery_retries(8);

        assert_eq!(config.base_url, "https://example.com/chat");
        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.language, "sw");
        assert_eq!(config.timeout_duration(), Duration::from_secs(60));
        assert_eq!(config.max_recovery_retries, 8);
    }

    #[test]
    fn test_config_partial_toml_uses_defaults() {
        let config: ChatConfig = toml::from_str(r#"language = "ki""#).unwrap();
        assert_eq!(config.language, "ki");
        assert_eq!(config.timeout_ms, 300_000);
        assert_eq!(config.base_url, default_base_url());
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ChatConfig::new()
            .with_api_key("secret")
            .with_language("sw")
            .with_chunk_timeout_ms(5_000);
        config.save(&path).unwrap();

        let loaded = ChatConfig::load(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.language, "sw");
        assert_eq!(loaded.chunk_timeout_ms, 5_000);
    }

    #[test]
    fn test_config_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ChatConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.language, "en");
    }
}
