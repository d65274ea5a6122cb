//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 驱动模块的加载与卸载
//!
//! 对应内核模块的 module_init / module_exit：
//! 分配设备、注册到协议栈，卸载时注销并释放

use crate::config::{DRIVER_NAME, DRIVER_VERSION, NAME_TEMPLATE};
use crate::drivers::net::mynetdev::{mynetdev_setup, MyNetdev};
use crate::drivers::net::space::{alloc_netdev, DeviceStats, NetdevRegistry, Netdev, NetifRx};
use crate::errno::Errno;
use crate::sync::SharedNetdev;
use crate::time::JiffiesSource;

/// 已加载的 mynetdev 模块
///
/// 持有唯一的设备实例。设备通过加锁句柄访问，可以在多个执行流间共享
pub struct MyNetdevModule<R: NetifRx, C: JiffiesSource> {
    netdev: SharedNetdev<MyNetdev<R, C>>,
    ifindex: u32,
}

impl<R: NetifRx, C: JiffiesSource> MyNetdevModule<R, C> {
    /// 加载模块
    ///
    /// # 参数
    /// - `registry`: 设备注册接口
    /// - `upper`: 上层接收接口
    /// - `clock`: jiffies 时钟源
    ///
    /// # 返回
    /// 注册失败时返回注册方给出的错误码，已分配的设备被释放
    pub fn init<G>(registry: &mut G, upper: R, clock: C) -> Result<Self, Errno>
    where
        G: NetdevRegistry + ?Sized,
    {
        pr_info!("mynetdev_init: loading {} {}", DRIVER_NAME, DRIVER_VERSION);

        let mut dev = alloc_netdev(NAME_TEMPLATE, mynetdev_setup)?;
        let ifindex = match registry.register_netdev(&mut dev) {
            Ok(ifindex) => ifindex,
            Err(err) => {
                pr_warn!("mynetdev_init: failed to register {}: {}", dev.get_name(), err);
                return Err(err);
            }
        };

        pr_info!(
            "mynetdev_init: module loaded, device {} ifindex {}",
            dev.get_name(),
            ifindex
        );
        Ok(MyNetdevModule {
            netdev: SharedNetdev::new(Netdev::new(dev, MyNetdev::new(upper, clock))),
            ifindex,
        })
    }

    /// 设备句柄
    pub fn netdev(&self) -> &SharedNetdev<MyNetdev<R, C>> {
        &self.netdev
    }

    /// 注册时分配的设备索引
    pub fn ifindex(&self) -> u32 {
        self.ifindex
    }

    /// 卸载模块
    ///
    /// 注销设备后释放，返回最终的统计信息和驱动
    pub fn exit<G>(self, registry: &mut G) -> (DeviceStats, MyNetdev<R, C>)
    where
        G: NetdevRegistry + ?Sized,
    {
        let (mut dev, drv) = self.netdev.into_inner().into_parts();
        pr_info!("mynetdev_exit: unloading, device {}", dev.get_name());
        registry.unregister_netdev(&mut dev);
        (dev.stats(), drv)
    }
}
