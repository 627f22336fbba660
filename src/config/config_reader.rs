// ==========================================
// 地铁列车编组诱导系统 - 配置读取 Trait
// ==========================================
// 职责: 定义引擎/API 所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（从 config_kv 表读取）, 测试中的 MockConfig
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::settings::{AlertThresholds, FleetConstraints, ForestSettings, ObjectiveWeights};
use async_trait::async_trait;

#[async_trait]
pub trait FleetConfigReader: Send + Sync {
    /// 获取编组计数约束
    ///
    /// # 默认值
    /// - target_service = 18, max_ibl = 4, strict_partition = false
    async fn get_fleet_constraints(&self) -> ConfigResult<FleetConstraints>;

    /// 获取六目标权重（已校验总和为 1.0）
    async fn get_objective_weights(&self) -> ConfigResult<ObjectiveWeights>;

    /// 获取告警阈值
    async fn get_alert_thresholds(&self) -> ConfigResult<AlertThresholds>;

    /// 获取随机森林参数
    async fn get_forest_settings(&self) -> ConfigResult<ForestSettings>;
}
