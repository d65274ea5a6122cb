//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络设备基类
//!
//! 遵循 Linux 内核的 net_device 设计
//! 参考: include/linux/netdevice.h, net/core/dev.c, net/ethernet/eth.c

use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use bitflags::bitflags;

use crate::config::{DEFAULT_MTU, TX_QUEUE_LEN, WATCHDOG_TIMEO_MS};
use crate::errno::Errno;
use crate::net::buffer::SkBuff;
use crate::time::{msecs_to_jiffies, time_after};

/// 设备名最大长度（含结尾的 0）
///
/// 对应 Linux 的 IFNAMSIZ
pub const IFNAMSIZ: usize = 16;

/// 硬件地址最大长度
///
/// 对应 Linux 的 MAX_ADDR_LEN
pub const MAX_ADDR_LEN: usize = 32;

/// 以太网地址长度
pub const ETH_ALEN: usize = 6;

/// 以太网头长度
pub const ETH_HLEN: u16 = 14;

/// ARP 硬件类型
///
/// 对应 Linux 的 ARPHRD_* (include/linux/if_arp.h)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum ArpHrdType {
    /// 以太网
    ARPHRD_ETHER = 1,
    /// 无 (None)
    ARPHRD_VOID = 0xFFFF,
}

bitflags! {
    /// 设备状态标志
    ///
    /// 对应 Linux 的 IFF_* (include/uapi/linux/if.h)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IfFlags: u32 {
        /// 接口已启动
        const UP        = 0x1;
        /// 支持广播
        const BROADCAST = 0x2;
        /// 混杂模式
        const PROMISC   = 0x100;
        /// 支持多播
        const MULTICAST = 0x1000;
    }
}

/// 发送队列状态
///
/// 对应 Linux 的 __QUEUE_STATE_DRV_XOFF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// 允许上层提交发送
    Started,
    /// 上层不应再提交发送
    Stopped,
}

/// 设备注册状态
///
/// 对应 Linux 的 net_device::reg_state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegState {
    /// 已分配，尚未注册
    Uninitialized,
    /// 已注册，名字不可再修改
    Registered,
    /// 已注销
    Unregistered,
}

/// 网络设备统计信息
///
/// 只有包计数；两个计数器只增不减
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStats {
    /// 接收包数
    pub rx_packets: u64,
    /// 发送包数
    pub tx_packets: u64,
}

/// 设备配置映射
///
/// 对应 Linux 的 struct ifmap (SIOCSIFMAP)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IfMap {
    pub mem_start: u64,
    pub mem_end: u64,
    pub base_addr: u16,
    pub irq: u8,
    pub dma: u8,
    pub port: u8,
}

/// ioctl 请求
///
/// 对应 Linux 的 struct ifreq，只保留接口名
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IfReq {
    /// 目标接口名
    pub ifr_name: [u8; IFNAMSIZ],
}

impl IfReq {
    /// 构造指向某个接口的请求
    pub fn new(name: &str) -> Self {
        let mut ifr_name = [0u8; IFNAMSIZ];
        let len = name.len().min(IFNAMSIZ - 1);
        ifr_name[..len].copy_from_slice(&name.as_bytes()[..len]);
        IfReq { ifr_name }
    }
}

/// ndo_start_xmit 的返回值
///
/// 对应 Linux 的 netdev_tx_t。回环发送不会失败，只有 NETDEV_TX_OK
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetdevTx {
    /// 驱动已接收数据包
    Ok,
}

/// 网络设备
///
/// 对应 Linux 的 net_device
///
/// # 说明
/// - 只保存设备数据，操作由 [`NetDeviceOps`] 实现
/// - 由 [`Netdev`] 把二者组合起来交给上层
#[derive(Debug, Clone)]
pub struct NetDevice {
    /// 设备名 (例如 "mynetdev0")，注册前可以是模板
    pub(crate) name: [u8; IFNAMSIZ],
    /// 设备索引，注册时分配
    pub(crate) ifindex: u32,
    /// MTU (最大传输单元)
    pub(crate) mtu: i32,
    /// 硬件类型
    pub(crate) type_: ArpHrdType,
    /// 硬件地址 (MAC 地址)
    pub(crate) dev_addr: [u8; MAX_ADDR_LEN],
    /// 广播地址
    pub(crate) broadcast: [u8; MAX_ADDR_LEN],
    /// 硬件地址长度
    pub(crate) addr_len: u8,
    /// 链路层头长度
    pub(crate) hard_header_len: u16,
    /// 发送队列长度
    pub(crate) tx_queue_len: u32,
    /// 设备状态
    pub(crate) flags: IfFlags,
    /// 发送队列状态
    pub(crate) queue_state: QueueState,
    /// 最近一次发送的时间 (jiffies)
    pub(crate) trans_start: u64,
    /// 发送超时判定时间 (jiffies)
    pub(crate) watchdog_timeo: u64,
    /// 统计信息
    pub(crate) stats: DeviceStats,
    /// 注册状态
    pub(crate) reg_state: RegState,
}

/// 分配网络设备
///
/// # 参数
/// - `name`: 设备名或带 `%d` 的模板
/// - `setup`: 设备初始化函数
///
/// # 返回
/// 名字为空或过长时返回 EINVAL
///
/// # 说明
/// 新设备处于 DOWN 状态，发送队列停止，计数器为 0
pub fn alloc_netdev(name: &str, setup: fn(&mut NetDevice)) -> Result<NetDevice, Errno> {
    let mut dev = NetDevice {
        name: [0u8; IFNAMSIZ],
        ifindex: 0,
        mtu: 0,
        type_: ArpHrdType::ARPHRD_VOID,
        dev_addr: [0u8; MAX_ADDR_LEN],
        broadcast: [0u8; MAX_ADDR_LEN],
        addr_len: 0,
        hard_header_len: 0,
        tx_queue_len: 0,
        flags: IfFlags::empty(),
        queue_state: QueueState::Stopped,
        trans_start: 0,
        watchdog_timeo: 0,
        stats: DeviceStats::default(),
        reg_state: RegState::Uninitialized,
    };
    dev.set_name(name)?;
    setup(&mut dev);
    Ok(dev)
}

/// 以太网通用初始化
///
/// 对应 Linux 的 ether_setup (net/ethernet/eth.c)
pub fn ether_setup(dev: &mut NetDevice) {
    dev.type_ = ArpHrdType::ARPHRD_ETHER;
    dev.hard_header_len = ETH_HLEN;
    dev.mtu = DEFAULT_MTU;
    dev.addr_len = ETH_ALEN as u8;
    dev.tx_queue_len = TX_QUEUE_LEN;
    dev.flags = IfFlags::BROADCAST | IfFlags::MULTICAST;
    dev.watchdog_timeo = msecs_to_jiffies(WATCHDOG_TIMEO_MS);
    dev.broadcast[..ETH_ALEN].fill(0xff);
}

impl NetDevice {
    /// 获取设备名
    pub fn get_name(&self) -> &str {
        let len = self.name.iter().position(|&c| c == 0).unwrap_or(IFNAMSIZ);
        core::str::from_utf8(&self.name[..len]).unwrap_or("")
    }

    /// 设置设备名
    ///
    /// # 返回
    /// - EBUSY: 设备已注册，名字不可修改
    /// - EINVAL: 名字为空、过长或含有 '/'、空白字符
    pub fn set_name(&mut self, name: &str) -> Result<(), Errno> {
        if self.reg_state == RegState::Registered {
            return Err(Errno::DeviceOrResourceBusy);
        }
        if !dev_valid_name(name) {
            return Err(Errno::InvalidArgument);
        }
        self.name = [0u8; IFNAMSIZ];
        self.name[..name.len()].copy_from_slice(name.as_bytes());
        Ok(())
    }

    /// 设备索引，未注册时为 0
    pub fn ifindex(&self) -> u32 {
        self.ifindex
    }

    /// MTU
    pub fn mtu(&self) -> i32 {
        self.mtu
    }

    /// 硬件类型
    pub fn hw_type(&self) -> ArpHrdType {
        self.type_
    }

    /// 硬件地址
    pub fn dev_addr(&self) -> &[u8] {
        &self.dev_addr[..self.addr_len as usize]
    }

    /// 广播地址
    pub fn broadcast(&self) -> &[u8] {
        &self.broadcast[..self.addr_len as usize]
    }

    /// 设置硬件地址
    ///
    /// # 说明
    /// 超过 MAX_ADDR_LEN 的部分被忽略
    pub fn set_address(&mut self, addr: &[u8]) {
        let len = addr.len().min(MAX_ADDR_LEN);
        self.addr_len = len as u8;
        self.dev_addr = [0u8; MAX_ADDR_LEN];
        self.dev_addr[..len].copy_from_slice(&addr[..len]);
    }

    /// 链路层头长度
    pub fn hard_header_len(&self) -> u16 {
        self.hard_header_len
    }

    /// 发送队列长度
    pub fn tx_queue_len(&self) -> u32 {
        self.tx_queue_len
    }

    /// 设备状态标志
    pub fn flags(&self) -> IfFlags {
        self.flags
    }

    /// 检查设备是否已启动
    pub fn is_up(&self) -> bool {
        self.flags.contains(IfFlags::UP)
    }

    /// 检查是否处于混杂模式
    pub fn is_promisc(&self) -> bool {
        self.flags.contains(IfFlags::PROMISC)
    }

    /// 注册状态
    pub fn reg_state(&self) -> RegState {
        self.reg_state
    }

    /// 统计信息快照
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// 发送队列状态
    pub fn queue_state(&self) -> QueueState {
        self.queue_state
    }

    /// 允许上层调用发送函数
    pub fn netif_start_queue(&mut self) {
        self.queue_state = QueueState::Started;
    }

    /// 禁止上层调用发送函数
    pub fn netif_stop_queue(&mut self) {
        self.queue_state = QueueState::Stopped;
    }

    /// 重新启动发送队列
    ///
    /// # 说明
    /// 不检查设备状态，DOWN 时同样生效
    pub fn netif_wake_queue(&mut self) {
        self.queue_state = QueueState::Started;
    }

    /// 发送队列是否已停止
    pub fn netif_queue_stopped(&self) -> bool {
        self.queue_state == QueueState::Stopped
    }

    /// 记录发送时间
    pub fn netif_trans_update(&mut self, now: u64) {
        self.trans_start = now;
    }

    /// 最近一次发送的时间 (jiffies)
    pub fn trans_start(&self) -> u64 {
        self.trans_start
    }

    /// 发送超时判定时间 (jiffies)
    pub fn watchdog_timeo(&self) -> u64 {
        self.watchdog_timeo
    }

    /// 发送队列是否已被判定为卡住
    ///
    /// 对应 Linux dev_watchdog 的判定：设备已启动、队列停止，
    /// 且距上次发送超过 watchdog_timeo
    pub fn tx_timeout_pending(&self, now: u64) -> bool {
        self.is_up()
            && self.netif_queue_stopped()
            && time_after(now, self.trans_start.wrapping_add(self.watchdog_timeo))
    }
}

/// 设备名是否合法
///
/// 对应 Linux 的 dev_valid_name
fn dev_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() < IFNAMSIZ
        && name != "."
        && name != ".."
        && !name.chars().any(|c| c == '/' || c == ':' || c.is_whitespace())
}

/// 网络设备操作接口
///
/// 对应 Linux 的 net_device_ops
///
/// # 说明
/// 所有操作都显式接收设备，驱动自身不持有设备
pub trait NetDeviceOps {
    /// 打开设备
    fn ndo_open(&mut self, dev: &mut NetDevice);

    /// 关闭设备
    fn ndo_stop(&mut self, dev: &mut NetDevice);

    /// 发送数据包
    fn ndo_start_xmit(&mut self, skb: SkBuff, dev: &mut NetDevice) -> NetdevTx;

    /// 获取统计信息
    fn ndo_get_stats(&self, dev: &NetDevice) -> DeviceStats {
        dev.stats
    }

    /// 设备相关的 ioctl 命令
    fn ndo_do_ioctl(&mut self, dev: &mut NetDevice, ifr: &mut IfReq, cmd: u32) -> Result<(), Errno>;

    /// 修改设备配置映射
    fn ndo_set_config(&mut self, dev: &mut NetDevice, map: &IfMap) -> Result<(), Errno>;

    /// 修改 MTU
    fn ndo_change_mtu(&mut self, dev: &mut NetDevice, new_mtu: i32) -> Result<(), Errno>;

    /// 发送超时处理
    fn ndo_tx_timeout(&mut self, dev: &mut NetDevice);
}

/// 设备注册接口
///
/// 对应 Linux 的 register_netdev / unregister_netdev
pub trait NetdevRegistry {
    /// 注册设备，成功返回分配的设备索引
    ///
    /// # 说明
    /// 失败时设备保持未注册状态
    fn register_netdev(&mut self, dev: &mut NetDevice) -> Result<u32, Errno>;

    /// 注销设备
    fn unregister_netdev(&mut self, dev: &mut NetDevice);
}

/// 上层接收接口
///
/// 对应 Linux 的 netif_rx
///
/// # 说明
/// - 在发送路径内被调用，此时设备仍处于发送方的临界区中
///   （使用 [`SharedNetdev`](crate::sync::SharedNetdev) 时锁未释放）
/// - 和 Linux 一样只负责入队，不能在这里回调同一个设备
///   （发送应答、读取统计等），否则自旋锁永远拿不到。
///   需要应答的上层先入队，返回后再处理
/// - `dev` 对应 skb->dev，是交付时刻设备的只读视图
pub trait NetifRx {
    /// 把数据包交给上层协议栈
    fn netif_rx(&mut self, skb: SkBuff, dev: &NetDevice);
}

impl<T: NetifRx + ?Sized> NetifRx for &mut T {
    fn netif_rx(&mut self, skb: SkBuff, dev: &NetDevice) {
        (**self).netif_rx(skb, dev)
    }
}

/// 接收积压队列
///
/// 对应 Linux 的 per-CPU backlog (softnet_data::input_pkt_queue)，
/// 上层从这里取走回送的数据包
#[derive(Debug, Default)]
pub struct Backlog {
    queue: VecDeque<SkBuff>,
    delivered: u64,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出最早的数据包
    pub fn dequeue(&mut self) -> Option<SkBuff> {
        self.queue.pop_front()
    }

    /// 取出全部数据包
    pub fn drain(&mut self) -> Vec<SkBuff> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// 累计交付次数
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl NetifRx for Backlog {
    fn netif_rx(&mut self, skb: SkBuff, _dev: &NetDevice) {
        self.delivered += 1;
        self.queue.push_back(skb);
    }
}

/// 网络设备注册表
///
/// 内存中的设备表：分配设备索引，解析 `%d` 名字模板，
/// 提供按名字、索引的查找
#[derive(Debug)]
pub struct DeviceTable {
    /// (ifindex, name)
    devices: Vec<(u32, String)>,
    next_ifindex: u32,
}

impl Default for DeviceTable {
    fn default() -> Self {
        DeviceTable {
            devices: Vec::new(),
            next_ifindex: 1,
        }
    }
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据名称查找设备索引
    pub fn get_netdevice_by_name(&self, name: &str) -> Option<u32> {
        self.devices
            .iter()
            .find(|(_, n)| n == name)
            .map(|(idx, _)| *idx)
    }

    /// 根据索引查找设备名
    pub fn get_netdevice_by_index(&self, ifindex: u32) -> Option<&str> {
        self.devices
            .iter()
            .find(|(idx, _)| *idx == ifindex)
            .map(|(_, n)| n.as_str())
    }

    /// 已注册设备数量
    pub fn get_netdevice_count(&self) -> usize {
        self.devices.len()
    }

    /// 解析设备名
    ///
    /// 对应 Linux 的 __dev_alloc_name：`%d` 替换为最小的未使用编号
    fn dev_alloc_name(&self, template: &str) -> Result<String, Errno> {
        let Some((prefix, suffix)) = template.split_once("%d") else {
            if self.get_netdevice_by_name(template).is_some() {
                return Err(Errno::FileExists);
            }
            return Ok(String::from(template));
        };
        if suffix.contains('%') {
            return Err(Errno::InvalidArgument);
        }

        let mut unit = 0u32;
        loop {
            let name = format!("{}{}{}", prefix, unit, suffix);
            if name.len() >= IFNAMSIZ {
                return Err(Errno::InvalidArgument);
            }
            if self.get_netdevice_by_name(&name).is_none() {
                return Ok(name);
            }
            unit += 1;
        }
    }
}

impl NetdevRegistry for DeviceTable {
    fn register_netdev(&mut self, dev: &mut NetDevice) -> Result<u32, Errno> {
        if dev.reg_state == RegState::Registered {
            return Err(Errno::InvalidArgument);
        }
        let name = self.dev_alloc_name(dev.get_name())?;
        dev.set_name(&name)?;

        let ifindex = self.next_ifindex;
        self.next_ifindex += 1;
        self.devices.push((ifindex, name));

        dev.ifindex = ifindex;
        dev.reg_state = RegState::Registered;
        Ok(ifindex)
    }

    fn unregister_netdev(&mut self, dev: &mut NetDevice) {
        if dev.reg_state != RegState::Registered {
            return;
        }
        self.devices.retain(|(idx, _)| *idx != dev.ifindex);
        dev.reg_state = RegState::Unregistered;
    }
}

/// 设备实例：设备数据 + 驱动操作
///
/// 上层 (net/core/dev.c) 通过它驱动设备：
/// 打开/关闭、发送、统计、配置、超时恢复
#[derive(Debug)]
pub struct Netdev<O: NetDeviceOps> {
    dev: NetDevice,
    ops: O,
}

impl<O: NetDeviceOps> Netdev<O> {
    pub fn new(dev: NetDevice, ops: O) -> Self {
        Netdev { dev, ops }
    }

    /// 设备数据
    pub fn device(&self) -> &NetDevice {
        &self.dev
    }

    /// 驱动
    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut O {
        &mut self.ops
    }

    /// 拆分为设备数据与驱动
    pub fn into_parts(self) -> (NetDevice, O) {
        (self.dev, self.ops)
    }

    /// 设备数据（可变），供调度方控制队列
    pub fn device_mut(&mut self) -> &mut NetDevice {
        &mut self.dev
    }

    /// 打开设备
    ///
    /// 对应 Linux 的 dev_open：调用驱动后置 IFF_UP
    pub fn open(&mut self) {
        self.ops.ndo_open(&mut self.dev);
        self.dev.flags.insert(IfFlags::UP);
    }

    /// 关闭设备
    ///
    /// 对应 Linux 的 dev_close：调用驱动后清除 IFF_UP
    pub fn stop(&mut self) {
        self.ops.ndo_stop(&mut self.dev);
        self.dev.flags.remove(IfFlags::UP);
    }

    /// 发送数据包
    ///
    /// # 说明
    /// 不检查队列状态，直接交给驱动
    pub fn start_xmit(&mut self, skb: SkBuff) -> NetdevTx {
        self.ops.ndo_start_xmit(skb, &mut self.dev)
    }

    /// 获取统计信息
    pub fn get_stats(&self) -> DeviceStats {
        self.ops.ndo_get_stats(&self.dev)
    }

    /// ioctl
    pub fn do_ioctl(&mut self, ifr: &mut IfReq, cmd: u32) -> Result<(), Errno> {
        self.ops.ndo_do_ioctl(&mut self.dev, ifr, cmd)
    }

    /// 修改设备配置映射
    pub fn set_config(&mut self, map: &IfMap) -> Result<(), Errno> {
        self.ops.ndo_set_config(&mut self.dev, map)
    }

    /// 修改 MTU
    pub fn change_mtu(&mut self, new_mtu: i32) -> Result<(), Errno> {
        self.ops.ndo_change_mtu(&mut self.dev, new_mtu)
    }

    /// 发送超时恢复
    pub fn tx_timeout(&mut self) {
        self.ops.ndo_tx_timeout(&mut self.dev);
    }

    /// 发送超时检查
    ///
    /// 对应 Linux 的 dev_watchdog，由调度方周期调用。
    /// 判定超时则调用驱动的超时处理并返回 true
    pub fn watchdog(&mut self, now: u64) -> bool {
        if self.dev.tx_timeout_pending(now) {
            self.tx_timeout();
            true
        } else {
            false
        }
    }
}
