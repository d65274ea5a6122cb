//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络设备驱动
//!
//! 遵循 Linux 内核的网络设备驱动设计
//! 参考: drivers/net/

pub mod space;
pub mod mynetdev;

pub use space::{
    NetDevice, NetDeviceOps, NetdevTx, DeviceStats,
    ArpHrdType, IfFlags, IfMap, IfReq, QueueState, RegState,
    NetdevRegistry, DeviceTable, NetifRx, Backlog, Netdev,
    alloc_netdev, ether_setup,
};

pub use mynetdev::{MyNetdev, mynetdev_setup, MYNETDEV_ADDR};
