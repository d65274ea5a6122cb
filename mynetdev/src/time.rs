//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 时钟滴答 (jiffies)
//!
//! 驱动本身不拥有定时器，时间戳由外部时钟源提供。
//! 参考: include/linux/jiffies.h

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::config::HZ;

/// jiffies 时钟源
///
/// 由驱动的调度方提供，发送路径用它给设备打时间戳
pub trait JiffiesSource {
    /// 当前 jiffies 值
    fn jiffies(&self) -> u64;
}

impl<T: JiffiesSource + ?Sized> JiffiesSource for &T {
    fn jiffies(&self) -> u64 {
        (**self).jiffies()
    }
}

impl<T: JiffiesSource + ?Sized> JiffiesSource for Arc<T> {
    fn jiffies(&self) -> u64 {
        (**self).jiffies()
    }
}

/// 手动推进的 jiffies 计数器
///
/// 调度方在每次时钟中断 (或测试中) 调用 `tick`
#[derive(Debug, Default)]
pub struct Jiffies {
    ticks: AtomicU64,
}

impl Jiffies {
    /// 从 0 开始计数
    pub const fn new() -> Self {
        Jiffies { ticks: AtomicU64::new(0) }
    }

    /// 从指定值开始计数
    pub const fn starting_at(ticks: u64) -> Self {
        Jiffies { ticks: AtomicU64::new(ticks) }
    }

    /// 前进 `n` 个滴答，返回新的值
    pub fn tick(&self, n: u64) -> u64 {
        self.ticks.fetch_add(n, Ordering::Relaxed).wrapping_add(n)
    }

    /// 获取当前 jiffies
    pub fn get_jiffies(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl JiffiesSource for Jiffies {
    fn jiffies(&self) -> u64 {
        self.get_jiffies()
    }
}

/// 毫秒转换为 jiffies（向上取整）
pub const fn msecs_to_jiffies(msecs: u64) -> u64 {
    (msecs * HZ + 999) / 1000
}

/// `a` 是否晚于 `b`（处理回绕）
///
/// 对应 Linux 的 time_after
#[inline]
pub const fn time_after(a: u64, b: u64) -> bool {
    (b.wrapping_sub(a) as i64) < 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jiffies_tick() {
        let j = Jiffies::new();
        assert_eq!(j.jiffies(), 0);
        assert_eq!(j.tick(3), 3);
        assert_eq!(j.tick(1), 4);
        assert_eq!(j.get_jiffies(), 4);
    }

    #[test]
    fn test_jiffies_through_arc() {
        let j = Arc::new(Jiffies::starting_at(42));
        let src: Arc<Jiffies> = j.clone();
        j.tick(8);
        assert_eq!(src.jiffies(), 50);
    }

    #[test]
    fn test_msecs_to_jiffies() {
        assert_eq!(msecs_to_jiffies(0), 0);
        assert_eq!(msecs_to_jiffies(1000), HZ);
        // 不足一个滴答按一个计算
        assert_eq!(msecs_to_jiffies(1), 1);
    }

    #[test]
    fn test_time_after_wraps() {
        assert!(time_after(10, 5));
        assert!(!time_after(5, 10));
        assert!(!time_after(7, 7));
        assert!(time_after(2, u64::MAX - 1));
    }
}
