//! SSE 流式解码
//!
//! 把字节块流还原为增量文本：行切分（splitter）、帧分类（parser）、
//! 增量抽取（delta）、跨块恢复与终止（decoder）。
//! 各层独立可测，decoder 串起全部流程。

pub mod decoder;
pub mod delta;
pub mod parser;
pub mod splitter;

pub use decoder::StreamDecoder;
pub use delta::{extract_delta, DeltaOutcome};
pub use parser::{classify_line, FrameEvent};
pub use splitter::LineSplitter;
