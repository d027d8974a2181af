//! 加载器配置
//!
//! 全局默认配置 + 每个加载器可单独注入。

use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

/// 加载器配置
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// 跳过顶点与面数据，只读取骨骼等元数据，默认 false
    /// 跳过时仍精确消费相同的字节数
    pub skip_geometry: bool,

    /// 期望的格式版本，默认 1.0；不一致时只输出警告
    pub expected_version: f32,

    /// 按计数预分配容量的上限（元素个数），默认 65536
    pub max_preallocate: usize,

    /// 是否输出逐区段调试日志，默认 false
    pub debug_log: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            skip_geometry: false,
            expected_version: 1.0,
            max_preallocate: 65536,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static LOADER_CONFIG: Lazy<RwLock<LoaderConfig>> =
    Lazy::new(|| RwLock::new(LoaderConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> LoaderConfig {
    LOADER_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// 设置全局配置
pub fn set_config(config: LoaderConfig) {
    *LOADER_CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(LoaderConfig::default());
}
