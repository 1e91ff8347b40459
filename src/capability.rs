//! 语音能力接口
//!
//! 语音采集与语音播报是平台能力，按目标平台各自实现。
//! 核心只依赖这里的 trait，不关心麦克风与合成器的具体来源。

use async_trait::async_trait;

use crate::error::ChatError;

/// 语音能力 Trait
///
/// `capture_utterance` 阻塞到一次完整的语音输入结束；
/// 用户取消或无输入时返回 `Ok(None)`，设备层故障返回错误。
#[async_trait]
pub trait VoiceCapability: Send + Sync {
    /// 采集一段语音并转写为文本
    ///
    /// `language` 为 BCP-47 语言标签（如 `en`、`sw`、`ki`），
    /// 实现据此选择识别语言。
    async fn capture_utterance(&self, language: &str) -> Result<Option<String>, ChatError>;

    /// 把文本播报为语音
    async fn render_speech(&self, text: &str, language: &str) -> Result<(), ChatError>;
}

/// 空实现
///
/// 无语音硬件的环境下使用：采集永远返回无输入，播报为空操作。
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVoice;

#[async_trait]
impl VoiceCapability for NullVoice {
    async fn capture_utterance(&self, _language: &str) -> Result<Option<String>, ChatError> {
        Ok(None)
    }

    async fn render_speech(&self, _text: &str, _language: &str) -> Result<(), ChatError> {
        Ok(())
    }
}
