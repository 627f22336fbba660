// ==========================================
// 地铁列车编组诱导系统 - 预测性维修模型
// ==========================================
// 职责: 基于历史样本训练回归模型, 预测风险分与距维修天数
// 输入: Trainset 列表 + 当前日期
// 输出: MaintenancePrediction 列表
// ==========================================
// 状态: is_trained 门控
// - 未训练: 全部走闭式启发式
// - 已训练: 9 维特征 → 标准化 → 随机森林 → 天数 → 风险分
// - 单车预测失败: 返回 Err, 批量调用显式回退到启发式, 不中断整批
// ==========================================

use crate::config::settings::ForestSettings;
use crate::domain::prediction::{HistoricalMaintenanceRecord, MaintenancePrediction, PredictionSource};
use crate::domain::trainset::Trainset;
use crate::domain::types::Priority;
use crate::engine::forest::{RandomForestRegressor, StandardScaler};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// 训练所需最少样本数
pub const MIN_TRAINING_SAMPLES: usize = 10;
/// 特征维度
pub const FEATURE_COUNT: usize = 9;
/// 预测窗口（天）
const HORIZON_DAYS: f64 = 30.0;
/// 启发式预测的固定置信度
const HEURISTIC_CONFIDENCE: f64 = 0.6;
/// 树间标准差达到该值时置信度降为 0
const SPREAD_FOR_ZERO_CONFIDENCE: f64 = 15.0;

// ==========================================
// PredictionError - 预测错误
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("模型尚未训练")]
    Untrained,

    #[error("训练样本不足: 实际 {samples}, 至少需要 {required}")]
    InsufficientData { samples: usize, required: usize },

    #[error("特征无效 (trainset={trainset_id}, feature={feature})")]
    InvalidFeature { trainset_id: String, feature: String },

    #[error("特征维度不一致: 期望 {expected}, 实际 {actual}")]
    FeatureWidthMismatch { expected: usize, actual: usize },

    #[error("模型错误: {0}")]
    Model(String),
}

// ==========================================
// TrainingSummary - 训练摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub samples: usize,
    pub tree_count: usize,
    /// 训练集平均绝对误差（天）
    pub training_mae_days: f64,
}

struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForestRegressor,
}

// ==========================================
// PredictiveMaintenanceModel - 预测性维修模型
// ==========================================
pub struct PredictiveMaintenanceModel {
    settings: ForestSettings,
    model: Option<TrainedModel>,
}

impl Default for PredictiveMaintenanceModel {
    fn default() -> Self {
        Self::new(ForestSettings::default())
    }
}

impl PredictiveMaintenanceModel {
    pub fn new(settings: ForestSettings) -> Self {
        Self {
            settings,
            model: None,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    // ==========================================
    // 训练
    // ==========================================

    /// 训练模型
    ///
    /// # 规则
    /// - 样本 < 10: 返回 InsufficientData, 模型保持未训练
    /// - 标签: 30 - maintenance_urgency
    /// - 训练失败不会覆盖已训练模型
    #[instrument(skip(self, historical_data), fields(samples = historical_data.len()))]
    pub fn train_model(
        &mut self,
        historical_data: &[HistoricalMaintenanceRecord],
    ) -> Result<TrainingSummary, PredictionError> {
        if historical_data.len() < MIN_TRAINING_SAMPLES {
            warn!(
                samples = historical_data.len(),
                required = MIN_TRAINING_SAMPLES,
                "训练样本不足, 保持启发式预测"
            );
            return Err(PredictionError::InsufficientData {
                samples: historical_data.len(),
                required: MIN_TRAINING_SAMPLES,
            });
        }

        let mut rows = Vec::with_capacity(historical_data.len());
        let mut labels = Vec::with_capacity(historical_data.len());
        for record in historical_data {
            rows.push(extract_features(&record.snapshot, record.observed_on)?);
            labels.push(record.label_days());
        }

        let scaler = StandardScaler::fit(&rows)?;
        let scaled: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<Result<_, _>>()?;
        let forest = RandomForestRegressor::fit(&scaled, &labels, &self.settings)?;

        let mut abs_err = 0.0;
        for (row, label) in scaled.iter().zip(&labels) {
            abs_err += (forest.predict(row)? - label).abs();
        }
        let summary = TrainingSummary {
            samples: rows.len(),
            tree_count: forest.tree_count(),
            training_mae_days: abs_err / rows.len() as f64,
        };

        self.model = Some(TrainedModel { scaler, forest });
        info!(
            samples = summary.samples,
            tree_count = summary.tree_count,
            training_mae_days = summary.training_mae_days,
            "维修预测模型训练完成"
        );
        Ok(summary)
    }

    // ==========================================
    // 预测
    // ==========================================

    /// 批量预测（单车失败时回退到启发式）
    #[instrument(skip(self, trainsets), fields(count = trainsets.len(), trained = self.is_trained()))]
    pub fn predict_maintenance(
        &self,
        trainsets: &[Trainset],
        today: NaiveDate,
    ) -> Vec<MaintenancePrediction> {
        trainsets
            .iter()
            .map(|trainset| match self.predict_one(trainset, today) {
                Ok(prediction) => prediction,
                Err(PredictionError::Untrained) => heuristic_prediction(trainset),
                Err(e) => {
                    warn!(trainset_id = %trainset.id, error = %e, "模型预测失败, 回退启发式");
                    heuristic_prediction(trainset)
                }
            })
            .collect()
    }

    /// 单车模型预测
    ///
    /// # 返回
    /// - Err(Untrained): 模型未训练
    /// - Err(InvalidFeature/...): 特征或模型异常
    pub fn predict_one(
        &self,
        trainset: &Trainset,
        today: NaiveDate,
    ) -> Result<MaintenancePrediction, PredictionError> {
        let model = self.model.as_ref().ok_or(PredictionError::Untrained)?;

        let features = extract_features(trainset, today)?;
        let scaled = model.scaler.transform(&features)?;
        let (days_raw, spread) = model.forest.predict_with_spread(&scaled)?;
        if !days_raw.is_finite() {
            return Err(PredictionError::Model(format!("{} 预测值非有限", trainset.id)));
        }

        let days = days_raw.clamp(0.0, HORIZON_DAYS);
        let risk_score = (100.0 - days / HORIZON_DAYS * 100.0).clamp(0.0, 100.0);
        let (recommended_action, priority) = model_tier(risk_score);
        let confidence = (1.0 - spread / SPREAD_FOR_ZERO_CONFIDENCE).clamp(0.0, 1.0);

        Ok(MaintenancePrediction {
            trainset_id: trainset.id.clone(),
            risk_score,
            days_until_maintenance: days,
            recommended_action: recommended_action.to_string(),
            priority,
            confidence,
            source: PredictionSource::Model,
        })
    }
}

/// 9 维特征
///
/// [total_km, since_maintenance_km, avg_wear, open_jobs,
///  rolling_stock, signalling, telecom, days_since_maintenance, reliability]
pub fn extract_features(trainset: &Trainset, today: NaiveDate) -> Result<Vec<f64>, PredictionError> {
    let as_flag = |b: bool| if b { 1.0 } else { 0.0 };
    let features = vec![
        trainset.mileage.total_km,
        trainset.mileage.since_maintenance_km,
        trainset.wear_avg(),
        trainset.job_cards.open_count as f64,
        as_flag(trainset.fitness.rolling_stock),
        as_flag(trainset.fitness.signalling),
        as_flag(trainset.fitness.telecom),
        trainset.days_since_maintenance(today) as f64,
        trainset.operational.reliability_score,
    ];

    const NAMES: [&str; FEATURE_COUNT] = [
        "total_km",
        "since_maintenance_km",
        "avg_wear",
        "open_jobs",
        "rolling_stock",
        "signalling",
        "telecom",
        "days_since_maintenance",
        "reliability",
    ];
    if let Some(pos) = features.iter().position(|v| !v.is_finite()) {
        return Err(PredictionError::InvalidFeature {
            trainset_id: trainset.id.clone(),
            feature: NAMES[pos].to_string(),
        });
    }
    Ok(features)
}

/// 闭式启发式预测
///
/// risk = clamp(wear_avg×0.7 + since_km/10000×30, 0, 100)
/// days = max(0, 30 - risk/100×30)
pub fn heuristic_prediction(trainset: &Trainset) -> MaintenancePrediction {
    let raw = trainset.wear_avg() * 0.7 + trainset.mileage.since_maintenance_km / 10_000.0 * 30.0;
    let risk_score = if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 100.0 };
    let days = (HORIZON_DAYS - risk_score / 100.0 * HORIZON_DAYS).max(0.0);

    let (action, priority) = if risk_score >= 70.0 {
        ("立即安排检修", Priority::High)
    } else if risk_score >= 40.0 {
        ("一周内安排检修", Priority::Medium)
    } else {
        ("继续正常运营", Priority::Low)
    };

    MaintenancePrediction {
        trainset_id: trainset.id.clone(),
        risk_score,
        days_until_maintenance: days,
        recommended_action: action.to_string(),
        priority,
        confidence: HEURISTIC_CONFIDENCE,
        source: PredictionSource::Heuristic,
    }
}

/// 模型预测分档: 75 / 50 / 25
fn model_tier(risk_score: f64) -> (&'static str, Priority) {
    if risk_score >= 75.0 {
        ("立即停运检修", Priority::Critical)
    } else if risk_score >= 50.0 {
        ("7 天内安排检修", Priority::High)
    } else if risk_score >= 25.0 {
        ("加强监测", Priority::Medium)
    } else {
        ("按计划例行保养", Priority::Low)
    }
}
