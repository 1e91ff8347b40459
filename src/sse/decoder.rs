//! 流解码器
//!
//! 串联行切分、帧分类与增量抽取，维护终止与跨块恢复状态。
//! 同步实现，不持有任何传输资源，每个回合一次性使用。

use tracing::{debug, warn};

use crate::error::ChatError;
use crate::sse::delta::{extract_delta, DeltaOutcome};
use crate::sse::parser::{classify_line, FrameEvent};
use crate::sse::splitter::LineSplitter;

/// 流解码器
///
/// 终止哨兵出现后即短路：同一块内的后续行与后续块全部被丢弃。
/// 截断载荷回注有次数上限，超限视为协议错误。
#[derive(Debug)]
pub struct StreamDecoder {
    splitter: LineSplitter,
    terminated: bool,
    /// 当前回注行的连续重试次数
    recovery_retries: u32,
    max_recovery_retries: u32,
}

impl StreamDecoder {
    /// 创建解码器
    pub fn new(max_recovery_retries: u32) -> Self {
        Self {
            splitter: LineSplitter::new(),
            terminated: false,
            recovery_retries: 0,
            max_recovery_retries,
        }
    }

    /// 是否已见到终止哨兵
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// 送入一个传输块，返回本次解出的全部增量片段（按序）
    ///
    /// 终止后送入的字节被静默丢弃。截断载荷触发回注并立即
    /// 结束本轮抽取；同一行重试超限或载荷结构非法时返回
    /// `MalformedFrame`。
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>, ChatError> {
        if self.terminated {
            return Ok(Vec::new());
        }
        self.splitter.push_bytes(chunk);

        let mut deltas = Vec::new();
        while !self.terminated {
            let Some(line) = self.splitter.next_line() else {
                break;
            };
            match classify_line(&line) {
                FrameEvent::Ignorable => continue,
                FrameEvent::Terminator => {
                    debug!("收到终止哨兵，丢弃缓冲中剩余 {} 字节", self.splitter.pending().len());
                    self.terminated = true;
                }
                FrameEvent::Data(payload) => match extract_delta(&payload) {
                    DeltaOutcome::Complete(fragment) => {
                        self.recovery_retries = 0;
                        if let Some(fragment) = fragment {
                            deltas.push(fragment);
                        }
                    }
                    DeltaOutcome::Incomplete => {
                        if self.recovery_retries >= self.max_recovery_retries {
                            warn!("截断载荷重试 {} 次仍未补全", self.recovery_retries);
                            return Err(ChatError::malformed_frame(format!(
                                "载荷在 {} 次回注后仍不完整: {}",
                                self.recovery_retries, payload
                            )));
                        }
                        self.recovery_retries += 1;
                        self.splitter.push_back(&line);
                        // 本轮抽取到此为止，等待后续字节补全
                        break;
                    }
                    DeltaOutcome::Invalid(reason) => {
                        return Err(ChatError::malformed_frame(format!(
                            "载荷结构非法: {reason}"
                        )));
                    }
                },
            }
        }
        Ok(deltas)
    }

    /// 流结束时收尾
    ///
    /// 末尾残留的无换行数据帧是非规范但可容忍的，能完整解析时
    /// 返回其增量片段；流结束后仍处于恢复态，或残留载荷截断/非法，
    /// 都是终局协议错误。
    pub fn finish(&mut self) -> Result<Option<String>, ChatError> {
        if self.terminated {
            return Ok(None);
        }
        if self.splitter.is_recovering() {
            return Err(ChatError::malformed_frame(format!(
                "流已结束但回注载荷始终未补全: {}",
                self.splitter.pending().trim()
            )));
        }

        let remainder = self.splitter.pending().to_string();
        self.splitter.reset();
        match classify_line(&remainder) {
            FrameEvent::Ignorable => Ok(None),
            FrameEvent::Terminator => {
                self.terminated = true;
                Ok(None)
            }
            FrameEvent::Data(payload) => match extract_delta(&payload) {
                DeltaOutcome::Complete(fragment) => Ok(fragment),
                DeltaOutcome::Incomplete => Err(ChatError::malformed_frame(format!(
                    "流已结束但末尾载荷不完整: {payload}"
                ))),
                DeltaOutcome::Invalid(reason) => Err(ChatError::malformed_frame(format!(
                    "末尾载荷结构非法: {reason}"
                ))),
            },
        }
    }
}

// ============================================================================
// 测试模块
// ============================================================================
