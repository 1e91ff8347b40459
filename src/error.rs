//! 聊天流错误类型
//!
//! 定义一次对话回合中可能发生的各种错误情况。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 聊天流错误类型
///
/// 涵盖从打开传输到流解码结束的所有失败情况。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ChatError {
    /// 传输层拒绝
    ///
    /// 远端返回了非成功状态码（429/402 之外的情况）。
    TransportRejected {
        /// HTTP 状态码
        status: u16,
        /// 错误消息
        message: String,
    },

    /// 限流
    ///
    /// 远端返回 429，提示用户稍后再试；不触碰会话记录。
    RateLimited,

    /// 需要付费
    ///
    /// 远端返回 402，提示用户充值；不触碰会话记录。
    PaymentRequired,

    /// 响应无可读正文
    NoBody,

    /// 帧结构损坏
    ///
    /// 数据帧的结构化载荷在流结束后仍然无法重组。
    MalformedFrame(String),

    /// 传输错误
    ///
    /// 读取过程中底层连接失败（网络中断、超时等）。
    TransportError(String),

    /// 输入为空
    ///
    /// 修剪后没有可发送的内容，回合未开始。
    EmptyInput,

    /// 回合被取消
    ClientCancelled,

    /// 会话忙
    ///
    /// 上一个回合仍在 Streaming/Draining，不允许并发回合。
    SessionBusy,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::TransportRejected { status, message } => {
                write!(f, "传输被拒绝 ({}): {}", status, message)
            }
            ChatError::RateLimited => write!(f, "请求过于频繁，请稍后再试"),
            ChatError::PaymentRequired => write!(f, "服务额度不足，请充值后重试"),
            ChatError::NoBody => write!(f, "响应缺少可读正文"),
            ChatError::MalformedFrame(msg) => write!(f, "帧结构损坏: {}", msg),
            ChatError::TransportError(msg) => write!(f, "传输错误: {}", msg),
            ChatError::EmptyInput => write!(f, "输入内容为空"),
            ChatError::ClientCancelled => write!(f, "回合已取消"),
            ChatError::SessionBusy => write!(f, "上一个回合尚未结束"),
        }
    }
}

impl std::error::Error for ChatError {}

// ============================================================================
// From trait 实现 - 用于错误转换
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::TransportError(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::TransportError(format!("请求超时: {}", err))
        } else if err.is_connect() {
            ChatError::TransportError(format!("连接失败: {}", err))
        } else {
            ChatError::TransportError(err.to_string())
        }
    }
}

// ============================================================================
// 辅助方法
// ============================================================================

impl ChatError {
    /// 创建传输拒绝错误
    pub fn transport_rejected(status: u16, message: impl Into<String>) -> Self {
        ChatError::TransportRejected {
            status,
            message: message.into(),
        }
    }

    /// 创建帧结构错误
    pub fn malformed_frame(msg: impl Into<String>) -> Self {
        ChatError::MalformedFrame(msg.into())
    }

    /// 创建传输错误
    pub fn transport(msg: impl Into<String>) -> Self {
        ChatError::TransportError(msg.into())
    }

    /// 按状态码映射失败种类
    ///
    /// 429 和 402 是专用种类，其余非成功状态统一归为传输拒绝。
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => ChatError::RateLimited,
            402 => ChatError::PaymentRequired,
            _ => ChatError::transport_rejected(status, message),
        }
    }

    /// 判断错误是否为用户提示类
    ///
    /// 限流和额度不足只向用户提示，不修改会话记录，也不清理占位条目。
    pub fn is_user_advisory(&self) -> bool {
        matches!(self, ChatError::RateLimited | ChatError::PaymentRequired)
    }

    /// 判断错误是否可由调用方重试
    ///
    /// 本层不做重试；该标记仅供上层策略参考。
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::RateLimited => true,
            ChatError::TransportError(_) => true,
            ChatError::TransportRejected { status, .. } => *status >= 500,
            ChatError::PaymentRequired => false,
            ChatError::NoBody => false,
            ChatError::MalformedFrame(_) => false,
            ChatError::EmptyInput => false,
            ChatError::ClientCancelled => false,
            ChatError::SessionBusy => false,
        }
    }

    /// 获取 HTTP 状态码（如果适用）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::TransportRejected { status, .. } => Some(*status),
            ChatError::RateLimited => Some(429),
            ChatError::PaymentRequired => Some(402),
            _ => None,
        }
    }
}

// ============================================================================
// 测试模块
// ============================================================================
