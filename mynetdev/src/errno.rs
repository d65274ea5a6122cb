//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 标准错误代码定义
//!
//! 和 include/uapi/asm-generic/errno-base.h 保持一致，只保留驱动会用到的部分

use core::fmt;

/// 标准错误代码
///
/// 使用方法：
/// ```rust
/// use mynetdev::errno::Errno;
///
/// fn set_config(up: bool) -> Result<(), Errno> {
///     if up {
///         return Err(Errno::DeviceOrResourceBusy);
///     }
///     Ok(())
/// }
///
/// assert_eq!(set_config(true).unwrap_err().as_neg_i32(), -16);
/// ```
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Errno {
    /// Operation not permitted (EPERM, 1)
    OperationNotPermitted = 1,

    /// Device or resource busy (EBUSY, 16)
    DeviceOrResourceBusy = 16,

    /// File exists (EEXIST, 17)
    FileExists = 17,

    /// Invalid argument (EINVAL, 22)
    InvalidArgument = 22,
}

impl Errno {
    /// 获取错误代码的正数值（用于比较）
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// 获取错误代码的负数值（驱动回调风格）
    #[inline]
    pub const fn as_neg_i32(self) -> i32 {
        -(self as i32)
    }

    /// 错误代码的符号名
    pub const fn name(self) -> &'static str {
        match self {
            Errno::OperationNotPermitted => "EPERM",
            Errno::DeviceOrResourceBusy => "EBUSY",
            Errno::FileExists => "EEXIST",
            Errno::InvalidArgument => "EINVAL",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Errno::OperationNotPermitted => "operation not permitted",
            Errno::DeviceOrResourceBusy => "device or resource busy",
            Errno::FileExists => "file exists",
            Errno::InvalidArgument => "invalid argument",
        };
        write!(f, "{} ({})", msg, self.name())
    }
}

/// 常用的错误代码常量
pub mod constants {
    pub const EPERM: i32 = 1;
    pub const EBUSY: i32 = 16;
    pub const EEXIST: i32 = 17;
    pub const EINVAL: i32 = 22;
}
