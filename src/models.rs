//! 聊天协议数据模型
//!
//! 定义请求体和流式响应载荷的序列化结构。

use serde::{Deserialize, Serialize};

use crate::transcript::{Role, TranscriptEntry};

/// 单条消息（请求体内）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireMessage {
    /// 角色（user / assistant）
    pub role: Role,
    /// 文本内容
    pub content: String,
}

impl WireMessage {
    /// 创建用户消息
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// 创建助手消息
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&TranscriptEntry> for WireMessage {
    fn from(entry: &TranscriptEntry) -> Self {
        Self {
            role: entry.role,
            content: entry.content.clone(),
        }
    }
}

/// 聊天请求体
///
/// 携带按会话顺序排列的历史消息、新的用户输入（已并入 messages 末尾）
/// 和界面语言标签。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 历史消息 + 新用户消息，顺序即会话顺序
    pub messages: Vec<WireMessage>,
    /// 语言标签（en / sw / ki）
    pub language: String,
}

impl ChatRequest {
    /// 由历史快照和新用户输入构建请求
    pub fn from_history(
        history: &[TranscriptEntry],
        user_content: &str,
        language: &str,
    ) -> Self {
        let mut messages: Vec<WireMessage> = history.iter().map(WireMessage::from).collect();
        messages.push(WireMessage::user(user_content));
        Self {
            messages,
            language: language.to_string(),
        }
    }
}

// ============================================================================
// 流式响应载荷
// ============================================================================

/// 流式响应的单个结构化载荷
///
/// 只关心首个 choice 的增量内容，其余字段容忍缺失。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChunk {
    /// choice 列表
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// 载荷中的单个 choice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    /// 增量
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// choice 内的增量
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// 增量文本；缺失表示该载荷不携带内容
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatChunk {
    /// 取出首个 choice 的增量文本
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}

// ============================================================================
// 测试模块
// ============================================================================
