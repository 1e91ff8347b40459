//! 帧分类
//!
//! 把一条候选行归类为数据帧、终止帧或可忽略帧。
//! 本层不做结构校验，畸形载荷留给增量抽取处理。

/// 数据帧前缀
pub const DATA_PREFIX: &str = "data: ";

/// 终止哨兵
pub const TERMINATOR_SENTINEL: &str = "[DONE]";

/// 帧事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// 携带结构化载荷的数据帧（已去前缀、已修剪）
    Data(String),
    /// 终止哨兵帧
    Terminator,
    /// 空行、注释行或未识别帧类型
    Ignorable,
}

/// 分类一条候选行
///
/// 未识别的帧类型一律丢弃而不报错，保持对上游协议扩展的容忍。
pub fn classify_line(line: &str) -> FrameEvent {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return FrameEvent::Ignorable;
    }

    match line.strip_prefix(DATA_PREFIX) {
        Some(rest) => {
            let payload = rest.trim();
            if payload == TERMINATOR_SENTINEL {
                FrameEvent::Terminator
            } else {
                FrameEvent::Data(payload.to_string())
            }
        }
        None => FrameEvent::Ignorable,
    }
}

// ============================================================================
// 测试模块
// ============================================================================
