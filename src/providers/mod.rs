//! 流式聊天 Provider
//!
//! 定义流式聊天后端必须实现的接口，并提供 reqwest 响应流
//! 到统一字节流的转换。会话控制器只依赖这里的 trait，
//! 测试里用脚本化字节流替换真实后端。

pub mod chat_api;

pub use chat_api::ChatApiProvider;

use crate::error::ChatError;
use crate::models::ChatRequest;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// 流式响应类型别名
///
/// 每个 Item 是一个传输块的字节数据或错误。
/// 使用 `Pin<Box<...>>` 以支持动态分发和异步迭代。
pub type ChatByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// 流式聊天 Provider Trait
///
/// 打开流即完成状态行与响应体校验：非成功状态与空响应体
/// 在这里映射为对应的错误种类，调用者拿到的流只包含响应体字节。
#[async_trait]
pub trait StreamingChatProvider: Send + Sync {
    /// 发起流式聊天请求
    ///
    /// # Returns
    ///
    /// * `Ok(ChatByteStream)` - 成功时返回响应体字节流
    /// * `Err(ChatError)` - 状态行被拒绝、响应体缺失或连接失败
    async fn open_stream(&self, request: &ChatRequest) -> Result<ChatByteStream, ChatError>;

    /// Provider 名称，用于日志记录
    fn provider_name(&self) -> &'static str;
}

/// 将 reqwest 的 bytes_stream 转换为 ChatByteStream
pub fn reqwest_stream_to_chat_stream(response: reqwest::Response) -> ChatByteStream {
    use futures::StreamExt;

    let stream = response.bytes_stream().map(|result| result.map_err(ChatError::from));
    Box::pin(stream)
}
