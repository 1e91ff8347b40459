//! 农事问答聊天 API Provider
//!
//! 对接托管在边缘函数上的流式聊天接口，按状态码区分
//! 限流、欠费与一般拒绝，空响应体单独成错。

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::models::ChatRequest;
use crate::providers::{reqwest_stream_to_chat_stream, ChatByteStream, StreamingChatProvider};

/// 聊天 API Provider
pub struct ChatApiProvider {
    config: ChatConfig,
    client: Client,
}

impl ChatApiProvider {
    /// 根据配置创建 Provider
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.timeout_duration())
            .build()
            .map_err(|e| ChatError::transport(format!("构建 HTTP 客户端失败: {e}")))?;
        Ok(Self { config, client })
    }

    /// 接口 URL
    ///
    /// 容忍配置里带尾部斜杠的写法。
    fn endpoint_url(&self) -> String {
        self.config.base_url.trim_end_matches('/').to_string()
    }

    /// 响应体元信息校验
    ///
    /// 宣告空正文（content-length 为 0）的成功响应映射为 `NoBody`；
    /// 未宣告长度的分块响应正常放行。
    fn screen_body(content_length: Option<u64>) -> Result<(), ChatError> {
        if content_length == Some(0) {
            Err(ChatError::NoBody)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// StreamingChatProvider Trait 实现
// ============================================================================

use async_trait::async_trait;

#[async_trait]
impl StreamingChatProvider for ChatApiProvider {
    /// 发起流式聊天请求
    ///
    /// 使用 reqwest 的 bytes_stream 返回字节流，状态行校验
    /// 在返回流之前完成。
    async fn open_stream(&self, request: &ChatRequest) -> Result<ChatByteStream, ChatError> {
        let url = self.endpoint_url();
        debug!(url = %url, messages = request.messages.len(), "发起流式聊天请求");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(api_key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = builder.json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "聊天请求被拒绝");
            return Err(ChatError::from_status(status.as_u16(), message));
        }
        Self::screen_body(response.content_length())?;

        Ok(reqwest_stream_to_chat_stream(response))
    }

    fn provider_name(&self) -> &'static str {
        "chat_api"
    }
}

// ============================================================================
// 测试模块
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_trims_trailing_slash() {
        let config = ChatConfig::default()
            .with_base_url("https://example.supabase.co/functions/v1/agricultural-chat/");
        let provider = ChatApiProvider::new(config).unwrap();
        assert_eq!(
            provider.endpoint_url(),
            "https://example.supabase.co/functions/v1/agricultural-chat"
        );
    }

    #[test]
    fn test_empty_body_maps_to_no_body() {
        assert_eq!(
            ChatApiProvider::screen_body(Some(0)).unwrap_err(),
            ChatError::NoBody
        );
        // 分块传输不宣告长度，正常放行
        assert!(ChatApiProvider::screen_body(None).is_ok());
        assert!(ChatApiProvider::screen_body(Some(512)).is_ok());
    }

    #[test]
    fn test_provider_name() {
        let provider = ChatApiProvider::new(ChatConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "chat_api");
    }
}
