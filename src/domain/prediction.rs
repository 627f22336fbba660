// ==========================================
// 地铁列车编组诱导系统 - 维修预测领域模型
// ==========================================
// 用途: PredictiveMaintenanceModel 的训练样本与预测输出
// ==========================================

use crate::domain::trainset::Trainset;
use crate::domain::types::Priority;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// PredictionSource - 预测来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionSource {
    Model,     // 随机森林回归
    Heuristic, // 闭式启发式回退
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionSource::Model => write!(f, "MODEL"),
            PredictionSource::Heuristic => write!(f, "HEURISTIC"),
        }
    }
}

// ==========================================
// MaintenancePrediction - 单车预测结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePrediction {
    pub trainset_id: String,
    pub risk_score: f64,             // [0, 100]
    pub days_until_maintenance: f64, // [0, 30]
    pub recommended_action: String,
    pub priority: Priority,
    pub confidence: f64,             // [0, 1]
    pub source: PredictionSource,
}

// ==========================================
// HistoricalMaintenanceRecord - 历史维修样本
// ==========================================
// maintenance_urgency 取值 [0, 30], 训练标签 = 30 - maintenance_urgency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMaintenanceRecord {
    pub snapshot: Trainset,
    pub observed_on: NaiveDate,
    pub maintenance_urgency: f64,
}

impl HistoricalMaintenanceRecord {
    /// 训练标签: 距离下次维修的天数
    pub fn label_days(&self) -> f64 {
        30.0 - self.maintenance_urgency.clamp(0.0, 30.0)
    }
}
