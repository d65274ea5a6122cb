//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 可共享的设备句柄
//!
//! [`Netdev`] 本身假定调用方已经串行化。多个执行流同时访问设备时，
//! 用 [`SharedNetdev`] 包装：状态切换、计数更新、配置修改都在同一把锁内完成。
//! 一次 `start_xmit` 从时间戳到交给上层都持有锁，顺序不会被打断。
//! 因此上层的 [`NetifRx`](crate::drivers::net::space::NetifRx) 只能入队，
//! 应答要等 `start_xmit` 返回后再发。

use spin::{Mutex, MutexGuard};

use crate::drivers::net::space::{DeviceStats, IfMap, IfReq, NetDeviceOps, Netdev, NetdevTx};
use crate::errno::Errno;
use crate::net::buffer::SkBuff;

/// 加锁的设备句柄
pub struct SharedNetdev<O: NetDeviceOps> {
    inner: Mutex<Netdev<O>>,
}

impl<O: NetDeviceOps> SharedNetdev<O> {
    pub fn new(netdev: Netdev<O>) -> Self {
        SharedNetdev {
            inner: Mutex::new(netdev),
        }
    }

    /// 获取锁，在一个临界区内执行多个操作
    pub fn lock(&self) -> MutexGuard<'_, Netdev<O>> {
        self.inner.lock()
    }

    /// 释放包装，取回设备
    pub fn into_inner(self) -> Netdev<O> {
        self.inner.into_inner()
    }

    pub fn open(&self) {
        self.inner.lock().open();
    }

    pub fn stop(&self) {
        self.inner.lock().stop();
    }

    pub fn start_xmit(&self, skb: SkBuff) -> NetdevTx {
        self.inner.lock().start_xmit(skb)
    }

    pub fn get_stats(&self) -> DeviceStats {
        self.inner.lock().get_stats()
    }

    pub fn do_ioctl(&self, ifr: &mut IfReq, cmd: u32) -> Result<(), Errno> {
        self.inner.lock().do_ioctl(ifr, cmd)
    }

    pub fn set_config(&self, map: &IfMap) -> Result<(), Errno> {
        self.inner.lock().set_config(map)
    }

    pub fn change_mtu(&self, new_mtu: i32) -> Result<(), Errno> {
        self.inner.lock().change_mtu(new_mtu)
    }

    pub fn tx_timeout(&self) {
        self.inner.lock().tx_timeout();
    }

    pub fn watchdog(&self, now: u64) -> bool {
        self.inner.lock().watchdog(now)
    }
}
