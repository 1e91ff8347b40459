//! 日志初始化
//!
//! 提供进程级 tracing 订阅器的初始化。库代码只通过 tracing
//! 宏发事件，订阅器由二进制入口或测试按需安装。

use tracing::Level;

/// 按级别名初始化全局日志订阅器
///
/// 重复调用安全（后续调用是空操作）。无法识别的级别名按 info 处理。
pub fn init_tracing(level: &str) {
    let level = match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init();
}
