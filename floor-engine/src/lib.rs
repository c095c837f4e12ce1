//! Floor Engine - 餐厅楼层分配引擎
//!
//! # 架构概述
//!
//! 为预订分配餐桌，并按时段 (日期 + 午/晚餐) 维护楼层布局：
//!
//! - **分配** (`assignment`): 手动 / 自动选桌策略
//! - **锁表** (`locks`): 按时间区间锁定餐桌
//! - **布局** (`layout`): 时段布局缓存，向后传播
//! - **拼桌** (`clusters`): 相邻餐桌分组，LRU 上限
//! - **存储** (`storage`): redb 快照持久化
//! - **门面** (`manager`): 预订簿 + 以上全部
//!
//! # 模块结构
//!
//! ```text
//! floor-engine/src/
//! ├── core/          # 配置
//! ├── geometry/      # 网格占用、相邻关系
//! ├── assignment/    # 选桌引擎
//! ├── locks.rs       # 区间锁表
//! ├── timeline.rs    # 按时段排序的条目与传播
//! ├── layout/        # 布局缓存
//! ├── clusters/      # 拼桌缓存与构建
//! ├── storage/       # 持久化 (memory / redb)
//! ├── presence.rs    # 多设备编辑提示
//! ├── manager/       # AllocationManager
//! └── utils/         # 日志
//! ```

pub mod assignment;
pub mod clusters;
pub mod core;
pub mod geometry;
pub mod layout;
pub mod locks;
pub mod manager;
pub mod presence;
pub mod storage;
pub mod timeline;
pub mod utils;

// Re-export 公共类型
pub use assignment::{AssignmentEngine, AssignmentError, AssignmentMode, TableAvailability};
pub use clusters::{ClusterBuilder, ClusterCache};
pub use core::EngineConfig;
pub use layout::{LayoutCache, MoveResult};
pub use locks::IntervalLockTable;
pub use manager::{AllocationError, AllocationManager, AllocationResult};
pub use presence::{NoPresence, SessionPresence, SharedPresence};
pub use storage::{FloorStore, MemoryStore, RedbStore, StorageError};

// Re-export unified error types from shared
pub use shared::error::{AppError, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境: 工作目录, 日志
pub fn setup_environment(config: &EngineConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, Some(&log_dir))?;

    match cleanup_old_logs(&log_dir) {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Old log files cleaned up"),
        Err(e) => tracing::warn!(error = %e, "Failed to clean up old logs"),
    }
    Ok(())
}
