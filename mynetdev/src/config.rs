//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 驱动配置
//!
//! 常量由 build.rs 根据 Netdev.toml 生成

include!(concat!(env!("OUT_DIR"), "/config.rs"));
