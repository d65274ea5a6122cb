//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! mynetdev 回环设备驱动
//!
//! 发送的数据包不经过任何介质，立即回送到本设备的接收路径，
//! 再交给上层协议栈。
//! 参考: drivers/net/loopback.c

use crate::drivers::net::space::{
    ether_setup, DeviceStats, IfFlags, IfMap, IfReq, NetDevice, NetDeviceOps, NetdevTx, NetifRx,
    ETH_ALEN,
};
use crate::errno::Errno;
use crate::net::buffer::SkBuff;
use crate::time::JiffiesSource;

/// 固定的硬件地址 00:01:02:03:04:05
pub const MYNETDEV_ADDR: [u8; ETH_ALEN] = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05];

/// 设备初始化函数
///
/// 以太网通用初始化，写入固定的硬件地址，并打开混杂模式
pub fn mynetdev_setup(dev: &mut NetDevice) {
    pr_info!("mynetdev_setup: setting up {}", dev.get_name());
    ether_setup(dev);
    dev.set_address(&MYNETDEV_ADDR);
    dev.flags.insert(IfFlags::PROMISC);
}

/// 回环设备驱动
///
/// # 说明
/// - `upper`: 上层接收接口，回送的数据包交给它
/// - `clock`: jiffies 时钟源，用于发送时间戳
#[derive(Debug)]
pub struct MyNetdev<R: NetifRx, C: JiffiesSource> {
    upper: R,
    clock: C,
}

impl<R: NetifRx, C: JiffiesSource> MyNetdev<R, C> {
    pub fn new(upper: R, clock: C) -> Self {
        MyNetdev { upper, clock }
    }

    /// 上层接收接口
    pub fn upper(&self) -> &R {
        &self.upper
    }

    pub fn upper_mut(&mut self) -> &mut R {
        &mut self.upper
    }

    /// 时钟源
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 接收数据包
    ///
    /// 先增加接收计数，再交给上层。上层看到的设备计数已经包含这个包
    pub fn mynetdev_rx(&mut self, skb: SkBuff, dev: &mut NetDevice) {
        dev.stats.rx_packets += 1;
        pr_debug!(
            "mynetdev_rx: {} received {} bytes, rx_packets={}",
            dev.get_name(),
            skb.len(),
            dev.stats.rx_packets
        );
        self.upper.netif_rx(skb, dev);
    }
}

impl<R: NetifRx, C: JiffiesSource> NetDeviceOps for MyNetdev<R, C> {
    fn ndo_open(&mut self, dev: &mut NetDevice) {
        pr_info!("mynetdev_open: opened the device {}", dev.get_name());
        dev.netif_start_queue();
    }

    fn ndo_stop(&mut self, dev: &mut NetDevice) {
        pr_info!("mynetdev_stop: stopped the device {}", dev.get_name());
        dev.netif_stop_queue();
    }

    /// 发送数据包
    ///
    /// # 说明
    /// 顺序固定：记录时间戳、增加发送计数、回送到接收路径。
    /// 队列停止时同样完整回送
    fn ndo_start_xmit(&mut self, mut skb: SkBuff, dev: &mut NetDevice) -> NetdevTx {
        let now = self.clock.jiffies();
        dev.netif_trans_update(now);
        skb.tstamp = now;

        dev.stats.tx_packets += 1;
        pr_debug!(
            "mynetdev_start_xmit: {} sending {} bytes, tx_packets={}",
            dev.get_name(),
            skb.len(),
            dev.stats.tx_packets
        );

        self.mynetdev_rx(skb, dev);
        NetdevTx::Ok
    }

    fn ndo_get_stats(&self, dev: &NetDevice) -> DeviceStats {
        pr_debug!(
            "mynetdev_get_stats: {} rx_packets={} tx_packets={}",
            dev.get_name(),
            dev.stats.rx_packets,
            dev.stats.tx_packets
        );
        dev.stats
    }

    /// 目前没有设备相关命令，所有请求直接确认
    fn ndo_do_ioctl(&mut self, dev: &mut NetDevice, _ifr: &mut IfReq, cmd: u32) -> Result<(), Errno> {
        pr_info!("mynetdev_do_ioctl: {} cmd={:#x}", dev.get_name(), cmd);
        Ok(())
    }

    /// 设备启动后不允许修改配置
    fn ndo_set_config(&mut self, dev: &mut NetDevice, _map: &IfMap) -> Result<(), Errno> {
        if dev.is_up() {
            pr_info!("mynetdev_set_config: {} is up, rejecting", dev.get_name());
            return Err(Errno::DeviceOrResourceBusy);
        }
        Ok(())
    }

    /// 不做范围检查
    fn ndo_change_mtu(&mut self, dev: &mut NetDevice, new_mtu: i32) -> Result<(), Errno> {
        pr_info!("mynetdev_change_mtu: {} {} -> {}", dev.get_name(), dev.mtu, new_mtu);
        dev.mtu = new_mtu;
        Ok(())
    }

    /// 无条件重启发送队列，不重发任何数据包
    fn ndo_tx_timeout(&mut self, dev: &mut NetDevice) {
        pr_info!(
            "mynetdev_tx_timeout: {} transmit timeout at {}",
            dev.get_name(),
            self.clock.jiffies()
        );
        dev.netif_wake_queue();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::net::space::{alloc_netdev, Backlog, QueueState};
    use crate::time::Jiffies;

    fn setup() -> (NetDevice, MyNetdev<Backlog, Jiffies>) {
        let dev = alloc_netdev("mynetdev%d", mynetdev_setup).unwrap();
        (dev, MyNetdev::new(Backlog::new(), Jiffies::starting_at(1000)))
    }

    #[test]
    fn test_setup_fixed_address() {
        let (dev, _) = setup();
        assert_eq!(dev.dev_addr(), &MYNETDEV_ADDR);
        assert!(dev.is_promisc());
        assert!(!dev.is_up());
        assert_eq!(dev.queue_state(), QueueState::Stopped);
    }

    #[test]
    fn test_open_stop_queue() {
        let (mut dev, mut drv) = setup();
        drv.ndo_open(&mut dev);
        assert_eq!(dev.queue_state(), QueueState::Started);
        drv.ndo_stop(&mut dev);
        assert_eq!(dev.queue_state(), QueueState::Stopped);
    }

    #[test]
    fn test_xmit_loops_back() {
        let (mut dev, mut drv) = setup();
        drv.ndo_open(&mut dev);
        assert_eq!(drv.ndo_start_xmit(SkBuff::from_slice(b"ping"), &mut dev), NetdevTx::Ok);

        assert_eq!(dev.stats().tx_packets, 1);
        assert_eq!(dev.stats().rx_packets, 1);
        assert_eq!(dev.trans_start(), 1000);

        let skb = drv.upper_mut().dequeue().unwrap();
        assert_eq!(skb.data(), b"ping");
        assert_eq!(skb.tstamp, 1000);
    }

    /// 记录每次交付时设备的状态
    #[derive(Default)]
    struct Recorder {
        /// (tstamp, trans_start, stats)
        seen: Vec<(u64, u64, DeviceStats)>,
    }

    impl NetifRx for Recorder {
        fn netif_rx(&mut self, skb: SkBuff, dev: &NetDevice) {
            self.seen.push((skb.tstamp, dev.trans_start(), dev.stats()));
        }
    }

    #[test]
    fn test_xmit_counts_before_deliver() {
        let mut dev = alloc_netdev("mynetdev%d", mynetdev_setup).unwrap();
        let mut drv = MyNetdev::new(Recorder::default(), Jiffies::starting_at(300));
        drv.ndo_open(&mut dev);

        let _ = drv.ndo_start_xmit(SkBuff::from_slice(&[0xAAu8, 0xBB]), &mut dev);
        drv.clock().tick(4);
        let _ = drv.ndo_start_xmit(SkBuff::from_slice(&[0xCCu8]), &mut dev);

        // 交付时时间戳已写入，tx 与 rx 都已计入当前包
        assert_eq!(
            drv.upper().seen,
            vec![
                (300, 300, DeviceStats { rx_packets: 1, tx_packets: 1 }),
                (304, 304, DeviceStats { rx_packets: 2, tx_packets: 2 }),
            ]
        );
    }

    #[test]
    fn test_rx_counts_before_deliver() {
        let mut dev = alloc_netdev("mynetdev%d", mynetdev_setup).unwrap();
        let mut drv = MyNetdev::new(Recorder::default(), Jiffies::new());

        drv.mynetdev_rx(SkBuff::from_slice(b"in"), &mut dev);
        assert_eq!(drv.upper().seen[0].2, DeviceStats { rx_packets: 1, tx_packets: 0 });
    }

    #[test]
    fn test_xmit_refreshes_trans_start() {
        let (mut dev, mut drv) = setup();
        let _ = drv.ndo_start_xmit(SkBuff::alloc(0), &mut dev);
        drv.clock().tick(25);
        let _ = drv.ndo_start_xmit(SkBuff::alloc(0), &mut dev);
        assert_eq!(dev.trans_start(), 1025);
    }

    #[test]
    fn test_set_config_busy_when_up() {
        let (mut dev, mut drv) = setup();
        let map = IfMap { irq: 5, ..IfMap::default() };
        assert_eq!(drv.ndo_set_config(&mut dev, &map), Ok(()));

        dev.flags.insert(IfFlags::UP);
        assert_eq!(
            drv.ndo_set_config(&mut dev, &map),
            Err(Errno::DeviceOrResourceBusy)
        );
    }

    #[test]
    fn test_change_mtu_accepts_anything() {
        let (mut dev, mut drv) = setup();
        for mtu in [9000, 0, -1, i32::MIN] {
            assert_eq!(drv.ndo_change_mtu(&mut dev, mtu), Ok(()));
            assert_eq!(dev.mtu(), mtu);
        }
    }

    #[test]
    fn test_ioctl_is_acknowledged() {
        let (mut dev, mut drv) = setup();
        let mut ifr = IfReq::new("mynetdev0");
        assert_eq!(drv.ndo_do_ioctl(&mut dev, &mut ifr, 0x89f0), Ok(()));
        assert_eq!(ifr, IfReq::new("mynetdev0"));
    }

    #[test]
    fn test_tx_timeout_wakes_queue() {
        let (mut dev, mut drv) = setup();
        drv.ndo_tx_timeout(&mut dev);
        assert_eq!(dev.queue_state(), QueueState::Started);
        assert!(!dev.is_up());
    }
}
