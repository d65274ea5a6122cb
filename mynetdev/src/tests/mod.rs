//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 场景测试
//!
//! 从模块加载开始驱动整个设备：生命周期、回环路径、配置钩子、超时恢复。
//!
//! 运行测试：
//! ```bash
//! cargo test --package mynetdev
//! ```

mod config_hooks;

use std::sync::Arc;

use crate::drivers::net::space::{Backlog, DeviceTable};
use crate::module::MyNetdevModule;
use crate::time::Jiffies;

/// 加载一个新的模块实例，返回模块、设备表和共享时钟
fn load() -> (MyNetdevModule<Backlog, Arc<Jiffies>>, DeviceTable, Arc<Jiffies>) {
    let mut table = DeviceTable::new();
    let clock = Arc::new(Jiffies::starting_at(5000));
    let module = MyNetdevModule::init(&mut table, Backlog::new(), Arc::clone(&clock))
        .expect("mynetdev_init failed");
    (module, table, clock)
}
