//! MIT License
//!
//! Copyright (c) 2026 Fei Wang
//!
//! 网络缓冲区 (SkBuff)
//!
//! 简化的 sk_buff：只携带负载和发送时间戳。
//! 缓冲区的分配与释放由 `Vec` 负责。

use alloc::vec::Vec;

/// 网络缓冲区
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkBuff {
    /// 负载数据
    data: Vec<u8>,
    /// 时间戳 (jiffies)，发送路径接收数据包时写入
    pub tstamp: u64,
}

impl SkBuff {
    /// 分配新的 SkBuff
    ///
    /// # 参数
    /// - `size`: 预留容量（字节数）
    ///
    /// # 说明
    /// 新缓冲区长度为 0
    pub fn alloc(size: usize) -> Self {
        SkBuff {
            data: Vec::with_capacity(size),
            tstamp: 0,
        }
    }

    /// 用已有数据构造 SkBuff
    pub fn from_slice(data: &[u8]) -> Self {
        SkBuff {
            data: data.to_vec(),
            tstamp: 0,
        }
    }

    /// 在尾部追加数据
    ///
    /// 对应 Linux 的 skb_put_data
    pub fn put_data(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// 数据长度
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 负载数据
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 取出负载数据，释放 SkBuff
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for SkBuff {
    fn from(data: Vec<u8>) -> Self {
        SkBuff { data, tstamp: 0 }
    }
}
