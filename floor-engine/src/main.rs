use floor_engine::{AllocationManager, EngineConfig, setup_environment};

fn main() -> anyhow::Result<()> {
    // 1. 加载 .env 与配置
    dotenv::dotenv().ok();
    let config = EngineConfig::from_env();

    // 2. 设置环境 (工作目录, 日志)
    setup_environment(&config)?;

    tracing::info!(
        work_dir = %config.work_dir,
        store = %config.store_path().display(),
        "Floor engine starting..."
    );

    // 3. 打开存储并恢复状态
    let manager = AllocationManager::open(&config)?;

    let layouts = manager.layout_stats();
    let clusters = manager.cluster_stats();
    let locks = manager.lock_stats();
    tracing::info!(
        reservations = manager.reservation_count(),
        layout_saves = layouts.saves,
        cluster_evictions = clusters.evictions,
        locks = locks.locks,
        "Floor engine ready"
    );

    Ok(())
}
