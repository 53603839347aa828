// ==========================================
// 车辆租赁库存系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入 / 限流所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::time::Duration;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    // ===== 导入配置 =====

    /// 响应中最多返回的错误条数
    ///
    /// # 默认值
    /// - 100
    async fn get_max_response_errors(&self) -> RepositoryResult<usize>;

    /// 年份下限（含）
    ///
    /// # 默认值
    /// - 1950
    async fn get_min_year(&self) -> RepositoryResult<i64>;

    /// 年份上限（含）
    ///
    /// # 默认值
    /// - 2100
    async fn get_max_year(&self) -> RepositoryResult<i64>;

    // ===== 操作限流配置 =====

    /// 计数窗口
    ///
    /// # 默认值
    /// - 60 秒
    async fn get_activity_window(&self) -> RepositoryResult<Duration>;

    /// 窗口内单用户最多记录的操作次数
    ///
    /// # 默认值
    /// - 5
    async fn get_activity_max_events(&self) -> RepositoryResult<usize>;
}
