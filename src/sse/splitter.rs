//! 行切分器
//!
//! 把任意切分的字节块流还原为完整文本行。未终结的尾部保留在
//! 待决缓冲里等待后续字节；跨块劈开的多字节 UTF-8 序列先在
//! 字节层暂存，凑齐后再进入文本缓冲；无效字节序列替换为
//! U+FFFD，不影响其后数据的解码。

/// 行切分器
///
/// 维护两级缓冲：`carry` 暂存不完整的 UTF-8 尾字节，
/// `pending` 暂存已解码但未见换行的文本。
#[derive(Debug, Default)]
pub struct LineSplitter {
    /// 已解码、未终结的文本
    pending: String,
    /// 跨块劈开的 UTF-8 尾字节
    carry: Vec<u8>,
    /// 待决缓冲头部是否为回注的恢复行
    recovering: bool,
}

impl LineSplitter {
    /// 创建空切分器
    pub fn new() -> Self {
        Self::default()
    }

    /// 送入一个字节块
    ///
    /// 块边界可以落在任何位置，包括多字节字符中间。
    /// 真正无效的字节序列替换为 U+FFFD 后继续解码，
    /// 只有块尾不完整的多字节序列才进入 carry 等待后续字节。
    pub fn push_bytes(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        let buf;
        let mut bytes: &[u8] = if self.carry.is_empty() {
            chunk
        } else {
            let mut merged = std::mem::take(&mut self.carry);
            merged.extend_from_slice(chunk);
            buf = merged;
            &buf
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.pending.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.pending
                        .push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or(""));
                    match err.error_len() {
                        // 无效序列：替换后跳过，流的其余部分照常解码
                        Some(invalid) => {
                            self.pending.push('\u{FFFD}');
                            bytes = &bytes[valid + invalid..];
                        }
                        // 块尾被劈开的多字节序列，留到下一块
                        None => {
                            self.carry = bytes[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
    }

    /// 取出下一个完整行（不含换行符，已去除行尾 \r）
    ///
    /// 待决缓冲里没有换行时返回 None。
    pub fn next_line(&mut self) -> Option<String> {
        let newline = self.pending.find('\n')?;
        let rest = self.pending.split_off(newline + 1);
        let mut line = std::mem::replace(&mut self.pending, rest);
        line.pop(); // '\n'
        if line.ends_with('\r') {
            line.pop();
        }
        self.recovering = false;
        Some(line)
    }

    /// 把一行回注到待决缓冲头部
    ///
    /// 跨块恢复路径：载荷被判定为截断时，原行连同换行符放回
    /// 缓冲最前端，与后续字节拼接后重试。回注后切分器进入
    /// 恢复态，直到该行再次被取出。
    pub fn push_back(&mut self, line: &str) {
        let mut restored = String::with_capacity(line.len() + 1 + self.pending.len());
        restored.push_str(line);
        restored.push('\n');
        restored.push_str(&self.pending);
        self.pending = restored;
        self.recovering = true;
    }

    /// 是否处于恢复态
    pub fn is_recovering(&self) -> bool {
        self.recovering
    }

    /// 待决缓冲内容
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// 是否还有未消费的字节或文本
    pub fn has_remainder(&self) -> bool {
        !self.pending.is_empty() || !self.carry.is_empty()
    }

    /// 清空全部状态
    pub fn reset(&mut self) {
        self.pending.clear();
        self.carry.clear();
        self.recovering = false;
    }
}

// ============================================================================
// 测试模块
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_multiple_lines() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"alpha\nbeta\n\ngamma");
        assert_eq!(s.next_line().as_deref(), Some("alpha"));
        assert_eq!(s.next_line().as_deref(), Some("beta"));
        assert_eq!(s.next_line().as_deref(), Some(""));
        assert_eq!(s.next_line(), None);
        assert_eq!(s.pending(), "gamma");
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"data: hel");
        assert_eq!(s.next_line(), None);
        s.push_bytes(b"lo\n");
        assert_eq!(s.next_line().as_deref(), Some("data: hello"));
    }

    #[test]
    fn test_crlf_stripped() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"data: x\r\n");
        assert_eq!(s.next_line().as_deref(), Some("data: x"));
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let mut s = LineSplitter::new();
        let text = "data: 玉米\n".as_bytes();
        // 在三字节字符中间切开
        let cut = text.iter().position(|&b| b >= 0x80).unwrap() + 1;
        s.push_bytes(&text[..cut]);
        assert_eq!(s.next_line(), None);
        s.push_bytes(&text[cut..]);
        assert_eq!(s.next_line().as_deref(), Some("data: 玉米"));
    }

    #[test]
    fn test_invalid_byte_replaced_and_decoding_continues() {
        let mut s = LineSplitter::new();
        let mut chunk = b": bad ".to_vec();
        chunk.push(0xff);
        chunk.extend_from_slice(b" byte\ndata: {\"x\":1}\n");
        s.push_bytes(&chunk);

        // 无效字节替换为 U+FFFD，其后的合法行照常产出
        assert_eq!(s.next_line().as_deref(), Some(": bad \u{FFFD} byte"));
        assert_eq!(s.next_line().as_deref(), Some("data: {\"x\":1}"));
        assert!(!s.has_remainder());
    }

    #[test]
    fn test_multiple_invalid_bytes_in_one_chunk() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"a\xff\xfeb\n");
        assert_eq!(s.next_line().as_deref(), Some("a\u{FFFD}\u{FFFD}b"));
    }

    #[test]
    fn test_invalid_byte_does_not_poison_carry() {
        let mut s = LineSplitter::new();
        // 无效字节后紧跟跨块劈开的合法多字节字符
        let text = "玉米\n".as_bytes();
        let mut chunk = vec![b'x', 0xff];
        chunk.extend_from_slice(&text[..2]);
        s.push_bytes(&chunk);
        assert_eq!(s.next_line(), None);
        s.push_bytes(&text[2..]);
        assert_eq!(s.next_line().as_deref(), Some("x\u{FFFD}玉米"));
    }

    #[test]
    fn test_push_back_then_more_bytes() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"data: {\"a\":1\n");
        let line = s.next_line().unwrap();
        s.push_back(&line);
        assert!(s.is_recovering());
        // 回注行与后续字节在换行前拼接不成立，此处模拟续块补全后
        // 取出的仍是回注行本身
        assert_eq!(s.next_line().as_deref(), Some("data: {\"a\":1"));
        assert!(!s.is_recovering());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = LineSplitter::new();
        s.push_bytes(b"partial");
        s.push_back("restored");
        s.reset();
        assert!(!s.has_remainder());
        assert!(!s.is_recovering());
        assert_eq!(s.next_line(), None);
    }
}
