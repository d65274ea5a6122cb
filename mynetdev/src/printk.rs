//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 驱动日志宏
//!
//! 所有日志通过 `log` 门面输出，target 为驱动名。
//! 未安装 logger 时日志被丢弃，不影响驱动行为。
//! 级别上限由 Netdev.toml 的 `debug.log_level` 决定。

macro_rules! pr_warn {
    ($($arg:tt)*) => ({
        if ::log::Level::Warn <= $crate::config::LOG_LEVEL {
            ::log::warn!(target: $crate::config::DRIVER_NAME, $($arg)*);
        }
    });
}

macro_rules! pr_info {
    ($($arg:tt)*) => ({
        if ::log::Level::Info <= $crate::config::LOG_LEVEL {
            ::log::info!(target: $crate::config::DRIVER_NAME, $($arg)*);
        }
    });
}

/// 数据包级别的日志，只在启用 `debug_log` 特性时输出
macro_rules! pr_debug {
    ($($arg:tt)*) => ({
        if cfg!(feature = "debug_log") && ::log::Level::Debug <= $crate::config::LOG_LEVEL {
            ::log::debug!(target: $crate::config::DRIVER_NAME, $($arg)*);
        }
    });
}
