//! mynetdev 构建脚本
//!
//! 这个脚本在编译前运行，负责：
//! 1. 解析 Netdev.toml 配置文件
//! 2. 生成配置代码 (OUT_DIR/config.rs)

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NetdevConfig {
    general: General,
    device: Device,
    time: Time,
    debug: DebugOptions,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct General {
    name: String,
    version: String,
}

impl Default for General {
    fn default() -> Self {
        General {
            name: "mynetdev".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Device {
    name_template: String,
    mtu: i32,
    tx_queue_len: u32,
    watchdog_timeo_ms: u64,
}

impl Default for Device {
    fn default() -> Self {
        Device {
            name_template: "mynetdev%d".to_string(),
            mtu: 1500,
            tx_queue_len: 1000,
            watchdog_timeo_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Time {
    hz: u64,
}

impl Default for Time {
    fn default() -> Self {
        Time { hz: 100 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DebugOptions {
    log_level: String,
}

impl Default for DebugOptions {
    fn default() -> Self {
        DebugOptions { log_level: "info".to_string() }
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../Netdev.toml");
    println!("cargo:rerun-if-changed=build.rs");

    // 没有配置文件时使用内置默认值
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let config_path = manifest_dir.join("../Netdev.toml");
    let config: NetdevConfig = match fs::read_to_string(&config_path) {
        Ok(content) => toml::from_str(&content).expect("Netdev.toml 解析失败"),
        Err(_) => {
            println!("cargo:warning=Netdev.toml not found, using built-in defaults");
            NetdevConfig::default()
        }
    };

    if config.time.hz == 0 {
        panic!("Netdev.toml: time.hz 必须大于 0");
    }
    // msecs_to_jiffies 在运行时计算 ms * hz + 999，这里先确认不会溢出
    let watchdog_overflows = config
        .device
        .watchdog_timeo_ms
        .checked_mul(config.time.hz)
        .and_then(|v| v.checked_add(999))
        .is_none();
    if watchdog_overflows {
        panic!("Netdev.toml: device.watchdog_timeo_ms * time.hz 超出 u64 范围");
    }
    if config.device.name_template.is_empty() || config.device.name_template.len() >= 16 {
        panic!("Netdev.toml: device.name_template 长度必须在 1..16 之间");
    }

    let log_level = match config.debug.log_level.to_ascii_lowercase().as_str() {
        "off" => "Off",
        "error" => "Error",
        "warn" => "Warn",
        "debug" => "Debug",
        "trace" => "Trace",
        _ => "Info",
    };

    generate_config_code(&config, log_level);
}

fn generate_config_code(config: &NetdevConfig, log_level: &str) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let code = format!(
        r#"// mynetdev 配置（自动生成）
//
// 此文件由 build.rs 根据 Netdev.toml 自动生成，请勿手动修改

/// 驱动名称
pub const DRIVER_NAME: &str = {:?};

/// 驱动版本
pub const DRIVER_VERSION: &str = {:?};

/// 设备名模板
pub const NAME_TEMPLATE: &str = {:?};

/// 以太网默认 MTU
pub const DEFAULT_MTU: i32 = {};

/// 发送队列长度
pub const TX_QUEUE_LEN: u32 = {};

/// 发送超时判定时间 (毫秒)
pub const WATCHDOG_TIMEO_MS: u64 = {};

/// 每秒时钟滴答数
pub const HZ: u64 = {};

/// 驱动日志的最高级别
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::{};
"#,
        config.general.name,
        config.general.version,
        config.device.name_template,
        config.device.mtu,
        config.device.tx_queue_len,
        config.device.watchdog_timeo_ms,
        config.time.hz,
        log_level,
    );

    fs::write(out_dir.join("config.rs"), code).expect("无法写入 config.rs");
}
