//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 配置钩子测试

use super::load;
use crate::drivers::net::space::{IfMap, IfReq};
use crate::errno::Errno;
use crate::net::buffer::SkBuff;

#[test]
fn test_set_config_busy_leaves_device_untouched() {
    let (module, _table, _clock) = load();
    let netdev = module.netdev();
    netdev.open();
    let _ = netdev.start_xmit(SkBuff::from_slice(b"abc"));

    let (mtu, flags, stats) = {
        let guard = netdev.lock();
        (guard.device().mtu(), guard.device().flags(), guard.get_stats())
    };

    let map = IfMap {
        base_addr: 0x300,
        irq: 9,
        ..IfMap::default()
    };
    assert_eq!(netdev.set_config(&map), Err(Errno::DeviceOrResourceBusy));

    let guard = netdev.lock();
    assert_eq!(guard.device().mtu(), mtu);
    assert_eq!(guard.device().flags(), flags);
    assert_eq!(guard.get_stats(), stats);
}

#[test]
fn test_set_config_after_stop() {
    let (module, _table, _clock) = load();
    let netdev = module.netdev();

    assert_eq!(netdev.set_config(&IfMap::default()), Ok(()));
    netdev.open();
    assert!(netdev.set_config(&IfMap::default()).is_err());
    netdev.stop();
    assert_eq!(netdev.set_config(&IfMap::default()), Ok(()));
}

#[test]
fn test_change_mtu_reads_back() {
    let (module, _table, _clock) = load();
    let netdev = module.netdev();

    for mtu in [68, 1500, 65535, 0, -42] {
        assert_eq!(netdev.change_mtu(mtu), Ok(()));
        assert_eq!(netdev.lock().device().mtu(), mtu);
    }

    // UP 时同样可以修改
    netdev.open();
    assert_eq!(netdev.change_mtu(9000), Ok(()));
    assert_eq!(netdev.lock().device().mtu(), 9000);
}

#[test]
fn test_ioctl_always_succeeds() {
    let (module, _table, _clock) = load();
    let netdev = module.netdev();
    let mut ifr = IfReq::new("mynetdev0");

    for cmd in [0u32, 0x89f0, 0x89ff, u32::MAX] {
        assert_eq!(netdev.do_ioctl(&mut ifr, cmd), Ok(()));
    }
    netdev.open();
    assert_eq!(netdev.do_ioctl(&mut ifr, 0x89f0), Ok(()));
    assert_eq!(netdev.get_stats().tx_packets, 0);
}
