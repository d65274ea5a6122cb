//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络子系统
//!
//! 参考: net/

pub mod buffer;

pub use buffer::SkBuff;
