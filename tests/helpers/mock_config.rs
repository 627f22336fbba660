// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use metro_fleet_dss::config::{
    AlertThresholds, ConfigError, ConfigResult, FleetConfigReader, FleetConstraints,
    ForestSettings, ObjectiveWeights,
};

/// Mock 配置结构
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub constraints: FleetConstraints,
    pub weights: ObjectiveWeights,
    pub thresholds: AlertThresholds,
    pub forest: ForestSettings,
}

impl MockConfig {
    /// 自定义投运/入库数量
    pub fn with_counts(target_service: usize, max_ibl: usize) -> Self {
        let mut config = Self::default();
        config.constraints.target_service = target_service;
        config.constraints.max_ibl = max_ibl;
        config
    }

    /// 严格划分（投运与入库候选不重叠）
    pub fn strict(mut self) -> Self {
        self.constraints.strict_partition = true;
        self
    }

    /// 小森林（加快测试）
    pub fn small_forest(mut self) -> Self {
        self.forest.tree_count = 10;
        self.forest.max_depth = 5;
        self
    }
}

#[async_trait]
impl FleetConfigReader for MockConfig {
    async fn get_fleet_constraints(&self) -> ConfigResult<FleetConstraints> {
        Ok(self.constraints.clone())
    }

    async fn get_objective_weights(&self) -> ConfigResult<ObjectiveWeights> {
        self.weights.validate()?;
        Ok(self.weights.clone())
    }

    async fn get_alert_thresholds(&self) -> ConfigResult<AlertThresholds> {
        Ok(self.thresholds.clone())
    }

    async fn get_forest_settings(&self) -> ConfigResult<ForestSettings> {
        if self.forest.tree_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "forest_tree_count".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        Ok(self.forest.clone())
    }
}
