//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! mynetdev: 回环虚拟网络设备驱动
//!
//! 发送的每个数据包都会立即回送到同一设备的接收路径。
//! 设备提供标准的网络接口生命周期和统计接口：
//! - open / stop 状态机与发送队列控制
//! - MTU、配置映射、ioctl 配置钩子
//! - rx/tx 包计数
//! - 发送超时恢复 (watchdog)
//!
//! 参考: drivers/net/loopback.c, net/core/dev.c

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod printk;

pub mod config;
pub mod drivers;
pub mod errno;
pub mod module;
pub mod net;
pub mod sync;
pub mod time;

#[cfg(test)]
mod tests;

pub use drivers::net::{
    Backlog, DeviceStats, DeviceTable, IfFlags, IfMap, IfReq, MyNetdev, NetDevice,
    NetDeviceOps, Netdev, NetdevRegistry, NetdevTx, NetifRx, QueueState, RegState,
};
pub use errno::Errno;
pub use module::MyNetdevModule;
pub use net::buffer::SkBuff;
pub use sync::SharedNetdev;
pub use time::{Jiffies, JiffiesSource};
