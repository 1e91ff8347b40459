//! 会话控制器
//!
//! 驱动一次完整的流式回合：打开传输、逐块解码、把增量拼装进
//! 会话记录，并维护回合状态机。同一会话同一时刻最多一个
//! 在途回合；取消与失败的善后策略都在这里收口。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::models::ChatRequest;
use crate::providers::StreamingChatProvider;
use crate::sse::StreamDecoder;
use crate::transcript::SharedTranscript;

/// 回合终局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// 正常结束（见到终止哨兵，或数据末尾被容忍）
    Success,
    /// 带错误种类的失败
    Failure(ChatError),
}

/// 回合状态机
///
/// 终态不会被重入；新回合总是从 `Opening` 重新开始。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// 无在途回合
    Idle,
    /// 已发起请求，等待状态行
    Opening,
    /// 响应体打开，逐块解码中
    Streaming,
    /// 传输端到达数据末尾，未见终止哨兵
    Draining,
    /// 回合结束
    Closed(TurnOutcome),
}

/// 一次成功回合的结果
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// 助手条目 id；空回合的占位已被清理时为 None
    pub entry_id: Option<String>,
    /// 拼装完成的助手全文
    pub content: String,
}

/// 回合过程事件，按发生顺序推送给观察者
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// 用户条目已入会话记录
    Started { user_entry_id: String },
    /// 一个增量片段已拼装进占位条目
    Delta { entry_id: String, fragment: String },
    /// 回合成功结束
    Completed { content: String },
    /// 回合失败
    Failed(ChatError),
}

/// 回合事件观察者
pub type TurnObserver = Arc<dyn Fn(&TurnEvent) + Send + Sync>;

/// 会话控制器
pub struct SessionController {
    provider: Arc<dyn StreamingChatProvider>,
    transcript: SharedTranscript,
    config: ChatConfig,
    state: RwLock<SessionState>,
    busy: AtomicBool,
    current_cancel: Mutex<CancellationToken>,
    observer: Mutex<Option<TurnObserver>>,
}

/// 在途回合标记，离开作用域时释放
struct TurnGuard<'a>(&'a AtomicBool);

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    /// 创建会话控制器
    pub fn new(
        provider: Arc<dyn StreamingChatProvider>,
        transcript: SharedTranscript,
        config: ChatConfig,
    ) -> Self {
        Self {
            provider,
            transcript,
            config,
            state: RwLock::new(SessionState::Idle),
            busy: AtomicBool::new(false),
            current_cancel: Mutex::new(CancellationToken::new()),
            observer: Mutex::new(None),
        }
    }

    /// 注册回合事件观察者，替换之前注册的观察者
    pub fn set_observer(&self, observer: TurnObserver) {
        *self.observer.lock() = Some(observer);
    }

    fn emit(&self, event: TurnEvent) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer(&event);
        }
    }

    /// 当前状态
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// 会话记录句柄
    pub fn transcript(&self) -> &SharedTranscript {
        &self.transcript
    }

    /// 取消当前在途回合
    ///
    /// 无在途回合时为空操作。被取消的回合以 `ClientCancelled`
    /// 失败收场，已拼装的部分内容保留。
    pub fn cancel_turn(&self) {
        self.current_cancel.lock().cancel();
    }

    fn set_state(&self, next: SessionState) {
        debug!(state = ?next, "回合状态迁移");
        *self.state.write() = next;
    }

    /// 发起一个流式回合
    ///
    /// 空白输入以 `EmptyInput` 拒绝；上一回合未结束时返回
    /// `SessionBusy`。`RateLimited` 与 `PaymentRequired` 属于用户
    /// 提示性错误，不改动会话记录；其余失败若占位条目仍为空则移除之。
    pub async fn send_turn(&self, user_content: &str) -> Result<TurnReport, ChatError> {
        let user_content = user_content.trim();
        if user_content.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ChatError::SessionBusy);
        }
        let _guard = TurnGuard(&self.busy);

        let cancel = {
            let token = CancellationToken::new();
            *self.current_cancel.lock() = token.clone();
            token
        };

        self.set_state(SessionState::Opening);
        let result = self.run_turn(user_content, &cancel).await;
        match &result {
            Ok(report) => {
                info!(chars = report.content.len(), "流式回合完成");
                self.set_state(SessionState::Closed(TurnOutcome::Success));
                self.emit(TurnEvent::Completed {
                    content: report.content.clone(),
                });
            }
            Err(err) => {
                warn!(
                    error = %err,
                    status = ?err.status_code(),
                    advisory = err.is_user_advisory(),
                    "流式回合失败"
                );
                self.set_state(SessionState::Closed(TurnOutcome::Failure(err.clone())));
                self.emit(TurnEvent::Failed(err.clone()));
            }
        }
        result
    }

    async fn run_turn(
        &self,
        user_content: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnReport, ChatError> {
        // 请求携带截至本回合的全部历史加新输入
        let request = {
            let transcript = self.transcript.read();
            ChatRequest::from_history(transcript.entries(), user_content, &self.config.language)
        };
        let user_entry_id = self.transcript.write().push_user(user_content);
        self.emit(TurnEvent::Started { user_entry_id });

        // 状态行被拒绝时占位条目尚未创建，会话记录不受影响
        let mut stream = self.provider.open_stream(&request).await?;

        self.set_state(SessionState::Streaming);
        let placeholder = self.transcript.write().begin_assistant();
        let mut decoder = StreamDecoder::new(self.config.max_recovery_retries);

        let pumped = self
            .pump_stream(&mut stream, &mut decoder, &placeholder, cancel)
            .await;

        if let Err(err) = pumped {
            let removed = self.transcript.write().remove_if_empty(&placeholder);
            debug!(removed_empty_placeholder = removed, "失败回合善后完成");
            return Err(err);
        }

        let content = self
            .transcript
            .read()
            .get(&placeholder)
            .map(|e| e.content.clone())
            .unwrap_or_default();

        // 零数据帧且无终止哨兵的空回合不在会话记录里留下空占位
        if content.is_empty() && !decoder.is_terminated() {
            self.transcript.write().remove_if_empty(&placeholder);
            return Ok(TurnReport {
                entry_id: None,
                content,
            });
        }
        Ok(TurnReport {
            entry_id: Some(placeholder),
            content,
        })
    }

    async fn pump_stream(
        &self,
        stream: &mut crate::providers::ChatByteStream,
        decoder: &mut StreamDecoder,
        placeholder: &str,
        cancel: &CancellationToken,
    ) -> Result<(), ChatError> {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(ChatError::ClientCancelled),
                item = timeout(self.config.chunk_timeout_duration(), stream.next()) => item,
            };
            let item = match next {
                Ok(item) => item,
                Err(_) => return Err(ChatError::transport("读取响应块超时")),
            };
            let Some(item) = item else {
                self.set_state(SessionState::Draining);
                break;
            };
            let bytes = item?;
            for delta in decoder.feed(&bytes)? {
                self.transcript.write().append_content(placeholder, &delta);
                self.emit(TurnEvent::Delta {
                    entry_id: placeholder.to_string(),
                    fragment: delta,
                });
            }
            if decoder.is_terminated() {
                // 终止哨兵短路：不再读取传输端剩余数据
                break;
            }
        }

        if let Some(tail) = decoder.finish()? {
            self.transcript.write().append_content(placeholder, &tail);
            self.emit(TurnEvent::Delta {
                entry_id: placeholder.to_string(),
                fragment: tail,
            });
        }
        Ok(())
    }
}

// ============================================================================
// 测试模块
// ============================================================================
