//! 会话记录
//!
//! 以插入顺序维护一次对话的全部条目。流式回合期间由会话控制器独占写入，
//! 观察者在两次变更之间读取一致快照。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 用户
    User,
    /// 助手
    Assistant,
}

/// 单条会话条目
///
/// 流式回合期间助手条目的 content 只追加不回退；
/// 条目 id 在整个流的生命周期内唯一可寻址。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// 会话内唯一标识
    pub id: String,
    /// 角色
    pub role: Role,
    /// 文本内容（流式期间追加式增长）
    pub content: String,
    /// 创建时间
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// 会话记录
///
/// 有序条目序列，插入顺序即会话顺序。条目从不重排。
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// 创建空会话记录
    pub fn new() -> Self {
        Self::default()
    }

    /// 以一条助手开场白作为初始条目创建会话记录
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut transcript = Self::new();
        transcript.seed_greeting(greeting);
        transcript
    }

    /// 追加一条助手开场白
    pub fn seed_greeting(&mut self, greeting: impl Into<String>) {
        self.entries.push(TranscriptEntry::new(Role::Assistant, greeting));
    }

    /// 追加用户条目，返回其 id
    pub fn push_user(&mut self, content: impl Into<String>) -> String {
        let entry = TranscriptEntry::new(Role::User, content);
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    /// 追加空内容的助手占位条目，返回其 id
    ///
    /// 占位条目在创建时刻总是最后一条。
    pub fn begin_assistant(&mut self) -> String {
        let entry = TranscriptEntry::new(Role::Assistant, "");
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    /// 把增量追加到指定条目
    ///
    /// 实现为整段替换（已有内容 + 新片段），保证观察者读到的
    /// 始终是一个完整的中间态。条目不存在时静默忽略。
    pub fn append_content(&mut self, id: &str, fragment: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            let mut updated = String::with_capacity(entry.content.len() + fragment.len());
            updated.push_str(&entry.content);
            updated.push_str(fragment);
            entry.content = updated;
        }
    }

    /// 若指定条目内容为空则移除
    ///
    /// 返回是否移除。失败回合用它清理空占位，避免会话记录
    /// 残留一条可见的空助手条目。
    pub fn remove_if_empty(&mut self, id: &str) -> bool {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.id == id && e.content.is_empty())
        {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// 按 id 查找条目
    pub fn get(&self, id: &str) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 条目切片（按会话顺序）
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// 一致快照
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        self.entries.clone()
    }
}

/// 跨层共享的会话记录句柄
///
/// 流式回合期间只有会话控制器写入；其余使用方只读快照。
pub type SharedTranscript = Arc<RwLock<Transcript>>;

/// 创建共享会话记录
pub fn shared(transcript: Transcript) -> SharedTranscript {
    Arc::new(RwLock::new(transcript))
}

// ============================================================================
// 测试模块
// ============================================================================
