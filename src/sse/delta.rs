//! 增量抽取
//!
//! 把数据帧载荷解析为结构化块并取出首个增量片段。
//! 解析失败不是异常路径：截断与非法是两个不同的结构化结果，
//! 截断触发跨块恢复，非法是协议错误。

use serde_json::error::Category;

use crate::models::ChatChunk;

/// 增量抽取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaOutcome {
    /// 载荷完整，片段可能为空（空增量是合法事件）
    Complete(Option<String>),
    /// 载荷在传输块边界被截断，需要回注等待后续字节
    Incomplete,
    /// 载荷完整但结构非法，附带解析错误描述
    Invalid(String),
}

/// 从数据帧载荷抽取增量片段
pub fn extract_delta(payload: &str) -> DeltaOutcome {
    match serde_json::from_str::<ChatChunk>(payload) {
        Ok(chunk) => DeltaOutcome::Complete(chunk.first_content()),
        Err(err) if err.classify() == Category::Eof => DeltaOutcome::Incomplete,
        Err(err) => DeltaOutcome::Invalid(err.to_string()),
    }
}

// ============================================================================
// 测试模块
// ============================================================================
