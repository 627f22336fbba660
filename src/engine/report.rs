// ==========================================
// 地铁列车编组诱导系统 - 车队报告引擎
// ==========================================
// 职责: 汇总优化结果、维修预测、告警, 生成驾驶舱报告
// 输出: FleetReport + 逐车编组计划行
// ==========================================

use crate::domain::alert::Alert;
use crate::domain::prediction::MaintenancePrediction;
use crate::domain::types::{Priority, Recommendation};
use crate::engine::optimizer::OptimizationResult;
use crate::engine::scoring::AiScoreEngine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 高风险阈值
const HIGH_RISK_THRESHOLD: f64 = 70.0;

// ==========================================
// InductionPlanRow - 编组计划行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InductionPlanRow {
    pub rank: usize,
    pub trainset_id: String,
    pub recommendation: Recommendation,
    pub manual_override: bool,
    pub ai_score: f64,
    pub optimization_score: f64,
    pub risk_score: Option<f64>,
    pub reasons: String,
}

// ==========================================
// FleetReport - 车队报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub generated_at: DateTime<Utc>,
    pub fleet_size: usize,
    pub service_count: usize,
    pub standby_count: usize,
    pub ibl_count: usize,
    pub conflict_count: usize,
    pub avg_ai_score: f64,
    pub avg_optimization_score: f64,
    pub fitness_compliance_pct: f64,
    pub avg_wear_pct: f64,
    pub branded_count: usize,
    pub total_branding_deficit_hours: f64,
    pub total_shunting_moves: u32,
    pub high_risk_trainsets: Vec<String>,
    /// 优先级 → 告警数量
    pub alert_counts: BTreeMap<String, usize>,
    pub plan: Vec<InductionPlanRow>,
}

// ==========================================
// ReportEngine - 车队报告引擎
// ==========================================
pub struct ReportEngine {
    scorer: AiScoreEngine,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        Self {
            scorer: AiScoreEngine::new(),
        }
    }

    /// 生成车队报告
    ///
    /// # 说明
    /// - 空车队时各均值为 0
    /// - plan 顺序与优化结果顺序一致（分数降序）
    pub fn build_fleet_report(
        &self,
        result: &OptimizationResult,
        predictions: &[MaintenancePrediction],
        alerts: &[Alert],
        now: DateTime<Utc>,
    ) -> FleetReport {
        let fleet = &result.trainsets;
        let n = fleet.len();
        let avg = |sum: f64| if n == 0 { 0.0 } else { sum / n as f64 };

        let risk_by_id: HashMap<&str, f64> = predictions
            .iter()
            .map(|p| (p.trainset_id.as_str(), p.risk_score))
            .collect();

        let mut high_risk_trainsets: Vec<String> = predictions
            .iter()
            .filter(|p| p.risk_score >= HIGH_RISK_THRESHOLD)
            .map(|p| p.trainset_id.clone())
            .collect();
        high_risk_trainsets.sort();

        let mut alert_counts: BTreeMap<String, usize> = [
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ]
        .iter()
        .map(|p| (p.to_string(), 0))
        .collect();
        for alert in alerts {
            *alert_counts.entry(alert.priority.to_string()).or_insert(0) += 1;
        }

        let plan = fleet
            .iter()
            .enumerate()
            .map(|(idx, t)| {
                let (_, reasons) = self.scorer.calculate_ai_score(t);
                InductionPlanRow {
                    rank: idx + 1,
                    trainset_id: t.id.clone(),
                    recommendation: t.recommendation,
                    manual_override: t.manual_override.is_some(),
                    ai_score: t.ai_score,
                    optimization_score: t.optimization_score,
                    risk_score: risk_by_id.get(t.id.as_str()).copied(),
                    reasons: reasons.join("; "),
                }
            })
            .collect();

        let valid = fleet.iter().filter(|t| t.fitness.overall_valid()).count();

        FleetReport {
            generated_at: now,
            fleet_size: n,
            service_count: result.service_count,
            standby_count: result.standby_count,
            ibl_count: result.ibl_count,
            conflict_count: result.conflicts.len(),
            avg_ai_score: avg(fleet.iter().map(|t| t.ai_score).sum()),
            avg_optimization_score: avg(fleet.iter().map(|t| t.optimization_score).sum()),
            fitness_compliance_pct: avg(valid as f64 * 100.0),
            avg_wear_pct: avg(fleet.iter().map(|t| t.wear_avg()).sum()),
            branded_count: fleet.iter().filter(|t| t.branding.is_branded()).count(),
            total_branding_deficit_hours: fleet
                .iter()
                .map(|t| t.branding.exposure_deficit_hours)
                .sum(),
            total_shunting_moves: fleet.iter().map(|t| t.stabling.shunting_moves).sum(),
            high_risk_trainsets,
            alert_counts,
            plan,
        }
    }
}
