//! 工具模块 - 日志等工具函数

pub mod logger;
