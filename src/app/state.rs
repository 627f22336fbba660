// ==========================================
// 地铁列车编组诱导系统 - 应用状态
// ==========================================
// 职责: 持有一次会话的车队、约束、预测模型、最近诱导结果和位置表
// 说明: 显式会话对象, 初始化一次, 只通过 setter 修改
// ==========================================

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::settings::FleetConstraints;
use crate::domain::trainset::Trainset;
use crate::engine::orchestrator::InductionOutcome;
use crate::engine::predictor::PredictiveMaintenanceModel;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::source::FleetDataSource;
use crate::tracking::{PositionUpdate, TrackingBoard};

/// 应用状态
pub struct AppState {
    db_path: String,
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
    source: Box<dyn FleetDataSource>,

    fleet: Vec<Trainset>,
    constraints: FleetConstraints,
    predictor: PredictiveMaintenanceModel,
    last_outcome: Option<InductionOutcome>,

    tracking_board: TrackingBoard,
    tracking_rx: Option<mpsc::Receiver<PositionUpdate>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 表示内存库）
    /// - source: 车队数据源
    ///
    /// # 说明
    /// - 配置与操作日志共享同一个连接
    /// - 车队为空, 需调用 FleetApi::load_fleet 加载
    pub fn new(db_path: &str, source: Box<dyn FleetDataSource>) -> ApiResult<Self> {
        tracing::info!(db_path, source = source.source_name(), "初始化AppState");

        let config_manager = if db_path == ":memory:" {
            ConfigManager::in_memory()?
        } else {
            ConfigManager::new(db_path)?
        };
        let config_manager = Arc::new(config_manager);
        let action_log_repo = Arc::new(ActionLogRepository::new(config_manager.connection()));

        Ok(Self {
            db_path: db_path.to_string(),
            config_manager,
            action_log_repo,
            source,
            fleet: Vec::new(),
            constraints: FleetConstraints::default(),
            predictor: PredictiveMaintenanceModel::default(),
            last_outcome: None,
            tracking_board: TrackingBoard::new(),
            tracking_rx: None,
        })
    }

    /// 内存库会话（测试/一次性运行）
    pub fn in_memory(source: Box<dyn FleetDataSource>) -> ApiResult<Self> {
        Self::new(":memory:", source)
    }

    // ==========================================
    // 基础设施
    // ==========================================

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn config_manager(&self) -> Arc<ConfigManager> {
        self.config_manager.clone()
    }

    pub fn action_log_repo(&self) -> Arc<ActionLogRepository> {
        self.action_log_repo.clone()
    }

    pub fn source_name(&self) -> &str {
        self.source.source_name()
    }

    pub fn source_mut(&mut self) -> &mut dyn FleetDataSource {
        self.source.as_mut()
    }

    pub fn set_source(&mut self, source: Box<dyn FleetDataSource>) {
        self.source = source;
    }

    // ==========================================
    // 车队
    // ==========================================

    pub fn fleet(&self) -> &[Trainset] {
        &self.fleet
    }

    /// 替换车队（旧的诱导结果随之失效）
    pub fn set_fleet(&mut self, fleet: Vec<Trainset>) {
        self.fleet = fleet;
        self.last_outcome = None;
    }

    /// 同时取得数据源与车队（刷新用）
    pub fn source_and_fleet_mut(&mut self) -> (&mut dyn FleetDataSource, &mut [Trainset]) {
        (self.source.as_mut(), &mut self.fleet)
    }

    pub fn trainset_mut(&mut self, trainset_id: &str) -> ApiResult<&mut Trainset> {
        self.fleet
            .iter_mut()
            .find(|t| t.id == trainset_id)
            .ok_or_else(|| ApiError::NotFound(format!("列车{}不存在", trainset_id)))
    }

    // ==========================================
    // 约束 / 模型 / 结果
    // ==========================================

    pub fn constraints(&self) -> &FleetConstraints {
        &self.constraints
    }

    pub fn set_constraints(&mut self, constraints: FleetConstraints) {
        self.constraints = constraints;
    }

    pub fn predictor(&self) -> &PredictiveMaintenanceModel {
        &self.predictor
    }

    pub fn set_predictor(&mut self, predictor: PredictiveMaintenanceModel) {
        self.predictor = predictor;
    }

    pub fn last_outcome(&self) -> Option<&InductionOutcome> {
        self.last_outcome.as_ref()
    }

    /// 记录诱导结果, 车队同步为结果中的评分/标签
    pub fn set_last_outcome(&mut self, outcome: InductionOutcome) {
        self.fleet = outcome.optimization.trainsets.clone();
        self.last_outcome = Some(outcome);
    }

    // ==========================================
    // 位置追踪
    // ==========================================

    pub fn tracking_board(&self) -> &TrackingBoard {
        &self.tracking_board
    }

    pub fn attach_tracking(&mut self, receiver: mpsc::Receiver<PositionUpdate>) {
        self.tracking_rx = Some(receiver);
    }

    /// 断开位置通道（位置表保留最后一次位置）
    pub fn detach_tracking(&mut self) {
        self.tracking_rx = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_rx.is_some()
    }

    /// 取出通道中的待处理位置更新
    ///
    /// # 说明
    /// - 模拟任务已结束（停止或异常退出）时自动断开通道
    pub fn sync_tracking(&mut self) -> usize {
        let Some(rx) = self.tracking_rx.as_mut() else {
            return 0;
        };
        let (applied, closed) = self.tracking_board.drain_until_idle(rx);
        if closed {
            tracing::debug!("位置模拟任务已结束, 断开通道");
            self.tracking_rx = None;
        }
        applied
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 METRO_FLEET_DSS_DB_PATH
/// 2. 用户数据目录/metro-fleet-dss/metro_fleet_dss.db
/// 3. ./metro_fleet_dss.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("METRO_FLEET_DSS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./metro_fleet_dss.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("metro-fleet-dss");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("metro_fleet_dss.db");
        }
    }

    path.to_string_lossy().to_string()
}
