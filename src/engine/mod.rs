// ==========================================
// 地铁列车编组诱导系统 - 引擎层
// ==========================================
// 职责: 实现评分、编组、预测、告警规则, 不拼 SQL
// 红线: Engine 不访问数据库, 评分规则必须输出 reason
// ==========================================

pub mod alerts;
pub mod forest;
pub mod objectives;
pub mod optimizer;
pub mod orchestrator;
pub mod predictor;
pub mod report;
pub mod scoring;

// 重导出核心引擎
pub use alerts::AlertManager;
pub use forest::{RandomForestRegressor, StandardScaler};
pub use objectives::{calculate_objective_scores, ObjectiveScores};
pub use optimizer::{Conflict, ConflictKind, MultiObjectiveOptimizer, OptimizationResult};
pub use orchestrator::{InductionOrchestrator, InductionOutcome};
pub use predictor::{PredictionError, PredictiveMaintenanceModel, TrainingSummary};
pub use report::{FleetReport, InductionPlanRow, ReportEngine};
pub use scoring::AiScoreEngine;
