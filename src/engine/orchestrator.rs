// ==========================================
// 地铁列车编组诱导系统 - 引擎编排器
// ==========================================
// 用途: 协调各引擎的执行顺序, 完成一次夜间编组诱导
// 流程: 评分 → 编组优化 → 维修预测 → 告警 → 报告
// ==========================================

use crate::config::settings::{AlertThresholds, FleetConstraints, ObjectiveWeights};
use crate::domain::alert::Alert;
use crate::domain::prediction::MaintenancePrediction;
use crate::domain::trainset::Trainset;
use crate::engine::alerts::AlertManager;
use crate::engine::optimizer::{MultiObjectiveOptimizer, OptimizationResult};
use crate::engine::predictor::PredictiveMaintenanceModel;
use crate::engine::report::{FleetReport, ReportEngine};
use crate::engine::scoring::AiScoreEngine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

// ==========================================
// InductionOutcome - 一次诱导的完整输出
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct InductionOutcome {
    pub optimization: OptimizationResult,
    pub predictions: Vec<MaintenancePrediction>,
    pub alerts: Vec<Alert>,
    pub report: FleetReport,
}

// ==========================================
// InductionOrchestrator - 引擎编排器
// ==========================================
pub struct InductionOrchestrator {
    scorer: AiScoreEngine,
    optimizer: MultiObjectiveOptimizer,
    alert_manager: AlertManager,
    reporter: ReportEngine,
}

impl Default for InductionOrchestrator {
    fn default() -> Self {
        Self::new(ObjectiveWeights::default(), AlertThresholds::default())
    }
}

impl InductionOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - weights: 六目标权重（调用方负责校验）
    /// - thresholds: 告警阈值
    pub fn new(weights: ObjectiveWeights, thresholds: AlertThresholds) -> Self {
        Self {
            scorer: AiScoreEngine::new(),
            optimizer: MultiObjectiveOptimizer::new(weights),
            alert_manager: AlertManager::new(thresholds),
            reporter: ReportEngine::new(),
        }
    }

    /// 执行一次完整诱导流程
    ///
    /// # 参数
    /// - fleet: 车队（所有权转入, 输出中按分数降序返回）
    /// - constraints: 投运/入库约束
    /// - predictor: 维修预测模型（未训练时走启发式）
    /// - now: 评估时间点
    #[instrument(skip_all, fields(count = fleet.len()))]
    pub fn run(
        &self,
        mut fleet: Vec<Trainset>,
        constraints: &FleetConstraints,
        predictor: &PredictiveMaintenanceModel,
        now: DateTime<Utc>,
    ) -> InductionOutcome {
        info!(
            target_service = constraints.target_service,
            max_ibl = constraints.max_ibl,
            strict_partition = constraints.strict_partition,
            "开始编组诱导"
        );

        // 1. AI 评分
        self.scorer.score_fleet(&mut fleet);
        debug!("AI 评分完成");

        // 2. 编组优化
        let optimization = self.optimizer.optimize_fleet_assignment(fleet, constraints);
        debug!(
            service = optimization.service_count,
            standby = optimization.standby_count,
            ibl = optimization.ibl_count,
            "编组优化完成"
        );

        // 3. 维修预测
        let predictions = predictor.predict_maintenance(&optimization.trainsets, now.date_naive());

        // 4. 告警
        let alerts = self
            .alert_manager
            .check_alerts(&optimization.trainsets, &optimization, now);

        // 5. 报告
        let report = self
            .reporter
            .build_fleet_report(&optimization, &predictions, &alerts, now);

        info!(
            fleet_size = report.fleet_size,
            conflicts = report.conflict_count,
            alerts = alerts.len(),
            high_risk = report.high_risk_trainsets.len(),
            "编组诱导完成"
        );

        InductionOutcome {
            optimization,
            predictions,
            alerts,
            report,
        }
    }
}
