// ==========================================
// 地铁列车编组诱导系统 - 车队编组 API
// ==========================================
// 职责: 加载/刷新车队, 训练预测模型, 执行编组诱导,
//       人工指定编组, 告警查询, 结果导出, 审计查询
// 红线: 人工指定只写入 manual_override, 下次诱导时生效
// 红线: 所有人工操作与诱导执行必须写入 ActionLog
// ==========================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::config::{FleetConfigReader, ObjectiveWeights};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::alert::Alert;
use crate::domain::types::{Priority, Recommendation};
use crate::engine::orchestrator::InductionOrchestrator;
use crate::engine::predictor::{PredictiveMaintenanceModel, TrainingSummary};
use crate::engine::report::FleetReport;
use crate::source::{write_fleet_csv, write_plan_csv, write_predictions_csv};
use crate::tracking::{TrackingHandle, TrackingSimulator};

/// 导出结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub fleet_csv: PathBuf,
    pub predictions_csv: PathBuf,
    pub plan_csv: PathBuf,
    pub report_json: PathBuf,
    pub rows_written: usize,
}

// ==========================================
// FleetApi - 车队编组 API
// ==========================================
pub struct FleetApi {
    actor: String,
}

impl Default for FleetApi {
    fn default() -> Self {
        Self::new("system")
    }
}

impl FleetApi {
    /// # 参数
    /// - actor: 操作人（写入审计日志）
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    fn record(
        &self,
        state: &AppState,
        action_type: ActionType,
        trainset_id: Option<&str>,
        payload: serde_json::Value,
        detail: String,
    ) -> ApiResult<()> {
        let log = ActionLog {
            action_id: Uuid::new_v4().to_string(),
            action_type,
            action_ts: Utc::now().naive_utc(),
            actor: self.actor.clone(),
            trainset_id: trainset_id.map(|s| s.to_string()),
            payload_json: Some(payload),
            detail: Some(detail),
        };
        state.action_log_repo().insert(&log)?;
        Ok(())
    }

    // ==========================================
    // 车队数据
    // ==========================================

    /// 从数据源加载车队（替换当前车队）
    pub fn load_fleet(&self, state: &mut AppState) -> ApiResult<usize> {
        let fleet = state.source_mut().load_fleet()?;
        let count = fleet.len();
        state.set_fleet(fleet);
        info!(count, source = state.source_name(), "车队已加载");
        Ok(count)
    }

    /// 刷新车队数据（保留人工指定）
    pub fn refresh_fleet(&self, state: &mut AppState) -> ApiResult<usize> {
        let (source, fleet) = state.source_and_fleet_mut();
        let updated = source.refresh(fleet)?;

        self.record(
            state,
            ActionType::RefreshFleet,
            None,
            json!({ "updated": updated, "source": state.source_name() }),
            format!("刷新车队数据: {} 列", updated),
        )?;
        Ok(updated)
    }

    // ==========================================
    // 预测模型
    // ==========================================

    /// 训练维修预测模型
    ///
    /// # 说明
    /// - 训练失败时保留原模型（未训练则继续走启发式）
    #[instrument(skip(self, state))]
    pub async fn train_predictor(&self, state: &mut AppState) -> ApiResult<TrainingSummary> {
        let settings = state.config_manager().get_forest_settings().await?;
        let history = state.source_mut().historical_records()?;

        let mut model = PredictiveMaintenanceModel::new(settings);
        let summary = model.train_model(&history)?;
        state.set_predictor(model);

        self.record(
            state,
            ActionType::TrainModel,
            None,
            serde_json::to_value(&summary).unwrap_or(serde_json::Value::Null),
            format!("训练维修预测模型: {} 个样本", summary.samples),
        )?;
        Ok(summary)
    }

    // ==========================================
    // 编组诱导
    // ==========================================

    /// 执行一次编组诱导
    ///
    /// # 流程
    /// 1. 读取约束/权重/阈值（权重未归一化直接拒绝）
    /// 2. 评分 → 优化 → 预测 → 告警 → 报告
    /// 3. 结果写回会话状态并记录审计日志
    #[instrument(skip(self, state), fields(fleet = state.fleet().len()))]
    pub async fn run_induction(&self, state: &mut AppState) -> ApiResult<FleetReport> {
        let config = state.config_manager();
        let constraints = config.get_fleet_constraints().await?;
        let weights = config.get_objective_weights().await?;
        let thresholds = config.get_alert_thresholds().await?;
        let snapshot = config.get_config_snapshot()?;

        let orchestrator = InductionOrchestrator::new(weights, thresholds);
        let outcome = orchestrator.run(
            state.fleet().to_vec(),
            &constraints,
            state.predictor(),
            Utc::now(),
        );
        let report = outcome.report.clone();

        state.set_constraints(constraints);
        state.set_last_outcome(outcome);

        self.record(
            state,
            ActionType::RunInduction,
            None,
            json!({
                "service": report.service_count,
                "standby": report.standby_count,
                "ibl": report.ibl_count,
                "conflicts": report.conflict_count,
                "config_snapshot": snapshot,
            }),
            format!(
                "编组诱导: 投运 {} / 备用 {} / 入库 {}",
                report.service_count, report.standby_count, report.ibl_count
            ),
        )?;
        Ok(report)
    }

    /// 人工指定编组（下次诱导时生效）
    pub fn set_manual_override(
        &self,
        state: &mut AppState,
        trainset_id: &str,
        label: Recommendation,
        reason: &str,
    ) -> ApiResult<()> {
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作原因不能为空".to_string()));
        }

        let trainset = state.trainset_mut(trainset_id)?;
        let previous = trainset.manual_override;
        trainset.manual_override = Some(label);
        info!(trainset_id, label = %label, "人工指定编组");

        self.record(
            state,
            ActionType::ManualOverride,
            Some(trainset_id),
            json!({
                "label": label.as_str(),
                "previous": previous.map(|p| p.as_str()),
                "reason": reason,
            }),
            format!("人工指定 {} → {}", trainset_id, label),
        )
    }

    /// 撤销人工指定
    ///
    /// # 返回
    /// - Ok(true): 存在并已撤销
    /// - Ok(false): 本来就没有人工指定
    pub fn clear_manual_override(&self, state: &mut AppState, trainset_id: &str) -> ApiResult<bool> {
        let trainset = state.trainset_mut(trainset_id)?;
        let previous = trainset.manual_override.take();

        match previous {
            Some(label) => {
                self.record(
                    state,
                    ActionType::ClearOverride,
                    Some(trainset_id),
                    json!({ "previous": label.as_str() }),
                    format!("撤销人工指定 {}", trainset_id),
                )?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 最近一次诱导的告警（优先级降序）
    pub fn list_alerts(&self, state: &AppState, min_priority: Option<Priority>) -> ApiResult<Vec<Alert>> {
        let outcome = state
            .last_outcome()
            .ok_or_else(|| ApiError::NotReady("尚未执行编组诱导".to_string()))?;

        let mut alerts: Vec<Alert> = outcome
            .alerts
            .iter()
            .filter(|a| min_priority.map_or(true, |p| a.priority >= p))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(alerts)
    }

    /// 最近的操作日志
    pub fn recent_actions(&self, state: &AppState, limit: usize) -> ApiResult<Vec<ActionLog>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(state.action_log_repo().list_recent(limit)?)
    }

    /// 更新配置并记录审计日志
    pub fn update_config(&self, state: &AppState, key: &str, value: &str) -> ApiResult<()> {
        state.config_manager().update_config(key, value)?;
        self.record(
            state,
            ActionType::ConfigUpdate,
            None,
            json!({ "key": key, "value": value }),
            format!("更新配置: {}={}", key, value),
        )
    }

    /// 整组更新目标权重并记录审计日志
    pub fn update_objective_weights(
        &self,
        state: &AppState,
        weights: &ObjectiveWeights,
    ) -> ApiResult<()> {
        state.config_manager().update_objective_weights(weights)?;
        self.record(
            state,
            ActionType::ConfigUpdate,
            None,
            json!({ "objective_weights": weights }),
            "整组更新目标权重".to_string(),
        )
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出车队 / 预测 / 编组计划 CSV 与报告 JSON
    pub fn export_outputs(&self, state: &AppState, dir: &Path) -> ApiResult<ExportSummary> {
        let outcome = state
            .last_outcome()
            .ok_or_else(|| ApiError::NotReady("尚未执行编组诱导".to_string()))?;

        std::fs::create_dir_all(dir)
            .map_err(|e| ApiError::ExportError(format!("{}: {}", dir.display(), e)))?;

        let summary = ExportSummary {
            fleet_csv: dir.join("fleet.csv"),
            predictions_csv: dir.join("maintenance_predictions.csv"),
            plan_csv: dir.join("induction_plan.csv"),
            report_json: dir.join("fleet_report.json"),
            rows_written: 0,
        };

        let mut rows = write_fleet_csv(&summary.fleet_csv, &outcome.optimization.trainsets)?;
        rows += write_predictions_csv(&summary.predictions_csv, &outcome.predictions)?;
        rows += write_plan_csv(&summary.plan_csv, &outcome.report.plan)?;

        let report_json = serde_json::to_string_pretty(&outcome.report)
            .map_err(|e| ApiError::ExportError(e.to_string()))?;
        std::fs::write(&summary.report_json, report_json)
            .map_err(|e| ApiError::ExportError(format!("{}: {}", summary.report_json.display(), e)))?;

        info!(dir = %dir.display(), rows, "诱导结果已导出");
        Ok(ExportSummary {
            rows_written: rows,
            ..summary
        })
    }

    // ==========================================
    // 位置追踪
    // ==========================================

    /// 启动位置模拟（需在 tokio 运行时内调用）
    ///
    /// # 说明
    /// - 上一个模拟任务已结束时允许重新启动
    pub fn start_tracking(&self, state: &mut AppState, interval: Duration, seed: u64) -> ApiResult<TrackingHandle> {
        if interval.is_zero() {
            return Err(ApiError::InvalidInput("位置更新间隔必须大于 0".to_string()));
        }
        state.sync_tracking();
        if state.is_tracking() {
            return Err(ApiError::BusinessRuleViolation("位置模拟已在运行".to_string()));
        }
        let ids: Vec<String> = state.fleet().iter().map(|t| t.id.clone()).collect();
        if ids.is_empty() {
            warn!("车队为空, 位置模拟不会产生更新");
        }

        let simulator = TrackingSimulator::new(&ids, seed, Utc::now());
        let (rx, handle) = simulator.spawn(interval, ids.len().max(1) * 4);
        state.attach_tracking(rx);
        Ok(handle)
    }

    /// 停止位置模拟并断开通道
    ///
    /// # 返回
    /// - 停止前最后取出的位置更新条数
    pub async fn stop_tracking(&self, state: &mut AppState, handle: TrackingHandle) -> usize {
        handle.shutdown().await;
        let applied = state.sync_tracking();
        state.detach_tracking();
        info!(applied, "位置模拟已停止");
        applied
    }
}
