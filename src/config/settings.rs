// ==========================================
// 地铁列车编组诱导系统 - 配置参数结构
// ==========================================
// 职责: 编组约束、目标权重、告警阈值、预测模型参数
// 说明: 所有结构都带默认值, config_kv 缺失时回退默认
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

// ==========================================
// FleetConstraints - 编组计数约束
// ==========================================
// target_service / max_ibl 都是上限, 不是目标值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetConstraints {
    pub target_service: usize,
    pub max_ibl: usize,
    /// true 时投运候选排除 open_jobs > 2 的列车, 使投运/入库候选集互斥
    pub strict_partition: bool,
}

impl Default for FleetConstraints {
    fn default() -> Self {
        Self {
            target_service: 18,
            max_ibl: 4,
            strict_partition: false,
        }
    }
}

// ==========================================
// ObjectiveWeights - 六目标权重
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub punctuality: f64,
    pub cost_efficiency: f64,
    pub branding_compliance: f64,
    pub maintenance_risk: f64,
    pub energy_efficiency: f64,
    pub operational_flexibility: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            punctuality: 0.25,
            cost_efficiency: 0.20,
            branding_compliance: 0.15,
            maintenance_risk: 0.20,
            energy_efficiency: 0.10,
            operational_flexibility: 0.10,
        }
    }
}

impl ObjectiveWeights {
    const SUM_TOLERANCE: f64 = 1e-6;

    pub fn sum(&self) -> f64 {
        self.punctuality
            + self.cost_efficiency
            + self.branding_compliance
            + self.maintenance_risk
            + self.energy_efficiency
            + self.operational_flexibility
    }

    /// 校验: 每项非负且总和为 1.0
    pub fn validate(&self) -> ConfigResult<()> {
        let parts = [
            ("weight_punctuality", self.punctuality),
            ("weight_cost_efficiency", self.cost_efficiency),
            ("weight_branding_compliance", self.branding_compliance),
            ("weight_maintenance_risk", self.maintenance_risk),
            ("weight_energy_efficiency", self.energy_efficiency),
            ("weight_operational_flexibility", self.operational_flexibility),
        ];
        for (key, value) in parts {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("权重必须为非负有限数, 实际为 {}", value),
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(ConfigError::WeightsNotNormalized(sum));
        }
        Ok(())
    }
}

// ==========================================
// AlertThresholds - 告警阈值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub fitness_expiry_days: i64,
    pub wear_critical_pct: f64,
    pub branding_deficit_hours: f64,
    pub min_service_ready: usize,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            fitness_expiry_days: 2,
            wear_critical_pct: 75.0,
            branding_deficit_hours: 15.0,
            min_service_ready: 12,
        }
    }
}

// ==========================================
// ForestSettings - 随机森林参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestSettings {
    pub tree_count: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestSettings {
    fn default() -> Self {
        Self {
            tree_count: 50,
            max_depth: 8,
            min_samples_split: 4,
            seed: 42,
        }
    }
}
