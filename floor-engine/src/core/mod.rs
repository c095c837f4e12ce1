//! 核心模块 - 引擎配置
//!
//! - [`EngineConfig`] - 引擎配置 (环境变量 + 默认值)

pub mod config;

pub use config::{
    EngineConfig, MAX_GRACE_MINUTES, MAX_GRID_SIDE, default_assignment_order, default_base_tables,
};
