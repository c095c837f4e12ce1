use std::path::PathBuf;

use shared::models::DiningTable;

/// Default table preference order (serpentine walk of the room)
pub const DEFAULT_ASSIGNMENT_ORDER: [&str; 7] = ["T1", "T2", "T3", "T4", "T6", "T7", "T5"];

/// Upper bound for `GRID_ROWS` / `GRID_COLUMNS`
pub const MAX_GRID_SIDE: i32 = 1_000;

/// Upper bound for the grace period (one day)
pub const MAX_GRACE_MINUTES: i64 = 24 * 60;

/// 引擎配置 - 楼层分配引擎的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./work_dir | 工作目录 (存储文件、日志) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 日志输出 |
/// | GRID_ROWS | 15 | 楼层网格行数 |
/// | GRID_COLUMNS | 18 | 楼层网格列数 |
/// | GRACE_PERIOD_MINUTES | 0 | 占用宽限期 (分钟) |
/// | CLUSTER_CACHE_CAPACITY | 100 | 拼桌缓存上限 |
/// | TABLE_ASSIGNMENT_ORDER | T1,T2,T3,T4,T6,T7,T5 | 分配优先顺序 |
///
/// # 示例
///
/// ```ignore
/// GRID_ROWS=20 TABLE_ASSIGNMENT_ORDER=T2,T1 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 工作目录，存储 redb 文件和日志
    pub work_dir: String,
    pub log_level: String,
    pub log_json: bool,
    pub grid_rows: i32,
    pub grid_columns: i32,
    /// Minutes a table stays blocked after the previous reservation ends
    pub grace_period_minutes: i64,
    pub cluster_cache_capacity: usize,
    /// Table names, most preferred first
    pub table_assignment_order: Vec<String>,
    /// Base table configuration used to seed empty timeslots
    pub base_tables: Vec<DiningTable>,
}

impl EngineConfig {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            grid_rows: std::env::var("GRID_ROWS")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(15)
                .clamp(0, MAX_GRID_SIDE),
            grid_columns: std::env::var("GRID_COLUMNS")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(18)
                .clamp(0, MAX_GRID_SIDE),
            grace_period_minutes: std::env::var("GRACE_PERIOD_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
                .clamp(0, MAX_GRACE_MINUTES),
            cluster_cache_capacity: std::env::var("CLUSTER_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            table_assignment_order: std::env::var("TABLE_ASSIGNMENT_ORDER")
                .ok()
                .map(|v| parse_assignment_order(&v))
                .filter(|order| !order.is_empty())
                .unwrap_or_else(default_assignment_order),
            base_tables: default_base_tables(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, base_tables: Vec<DiningTable>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.base_tables = base_tables;
        config
    }

    pub fn with_assignment_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_assignment_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_grace_period(mut self, minutes: i64) -> Self {
        self.grace_period_minutes = minutes.clamp(0, MAX_GRACE_MINUTES);
        self
    }

    pub fn with_cluster_capacity(mut self, capacity: usize) -> Self {
        self.cluster_cache_capacity = capacity;
        self
    }

    /// redb 数据库文件路径
    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("floor.redb")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse a comma separated list of table names, ignoring blanks
pub fn parse_assignment_order(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

pub fn default_assignment_order() -> Vec<String> {
    DEFAULT_ASSIGNMENT_ORDER.iter().map(|s| s.to_string()).collect()
}

/// Seven two-seat tables laid out on the default 15x18 grid
pub fn default_base_tables() -> Vec<DiningTable> {
    [
        (1, "T1", 1, 14),
        (2, "T2", 1, 10),
        (3, "T3", 1, 6),
        (4, "T4", 1, 1),
        (5, "T5", 8, 7),
        (6, "T6", 6, 1),
        (7, "T7", 11, 1),
    ]
    .into_iter()
    .map(|(id, name, row, column)| DiningTable::new(id, name, 2, row, column))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment_order() {
        assert_eq!(parse_assignment_order("T2, T1,,T3 "), vec!["T2", "T1", "T3"]);
        assert!(parse_assignment_order(" , ").is_empty());
    }

    #[test]
    fn test_default_base_tables_fit_grid() {
        let tables = default_base_tables();
        assert_eq!(tables.len(), 7);
        for table in &tables {
            assert!(table.row >= 0 && table.row + table.height <= 15, "{}", table.name);
            assert!(table.column >= 0 && table.column + table.width <= 18, "{}", table.name);
            assert_eq!(table.capacity, 2);
        }
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::with_overrides("/tmp/floor", Vec::new())
            .with_assignment_order(["A", "B"])
            .with_grace_period(15)
            .with_cluster_capacity(3);
        assert_eq!(config.work_dir, "/tmp/floor");
        assert!(config.base_tables.is_empty());
        assert_eq!(config.table_assignment_order, vec!["A", "B"]);
        assert_eq!(config.grace_period_minutes, 15);
        assert_eq!(config.cluster_cache_capacity, 3);
        assert!(config.store_path().ends_with("floor.redb"));
    }

    #[test]
    fn test_grace_period_is_bounded() {
        let config = EngineConfig::with_overrides("/tmp/floor", Vec::new());
        assert_eq!(
            config.clone().with_grace_period(i64::MAX).grace_period_minutes,
            MAX_GRACE_MINUTES
        );
        assert_eq!(config.with_grace_period(-5).grace_period_minutes, 0);
    }
}
