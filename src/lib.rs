//! 农事问答流式会话核心
//!
//! 把流式聊天接口的字节流还原为增量文本并拼装成会话记录，
//! 不依赖任何渲染层。
//!
//! # 主要组件
//!
//! - `sse`: SSE 流式解码（行切分、帧分类、增量抽取、跨块恢复）
//! - `transcript`: 会话记录与共享句柄
//! - `session`: 会话控制器与回合状态机
//! - `providers`: 流式聊天 Provider 接口与 HTTP 实现
//! - `models`: 请求与流式载荷类型
//! - `config`: 客户端配置
//! - `error`: 错误种类定义
//! - `capability`: 平台语音能力接口
//! - `telemetry`: 日志初始化

pub mod capability;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod session;
pub mod sse;
pub mod telemetry;
pub mod transcript;

// 重新导出核心类型
pub use capability::{NullVoice, VoiceCapability};
pub use config::{ChatConfig, ConfigError};
pub use error::ChatError;
pub use models::{ChatChunk, ChatRequest, WireMessage};
pub use providers::{ChatApiProvider, ChatByteStream, StreamingChatProvider};
pub use session::{
    SessionController, SessionState, TurnEvent, TurnObserver, TurnOutcome, TurnReport,
};
pub use sse::{DeltaOutcome, FrameEvent, LineSplitter, StreamDecoder};
pub use telemetry::init_tracing;
pub use transcript::{shared, Role, SharedTranscript, Transcript, TranscriptEntry};
