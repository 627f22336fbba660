// ==========================================
// 地铁列车编组诱导系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 决策支持系统 (人工最终控制权)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 操作日志
pub mod repository;

// 引擎层 - 评分/编组/预测/告警/报告
pub mod engine;

// 数据源层 - 模拟 / CSV
pub mod source;

// 位置追踪 - 后台模拟任务
pub mod tracking;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 会话状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertType, CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Priority,
    Recommendation,
};

// 领域实体
pub use domain::{ActionLog, ActionType, Alert, MaintenancePrediction, Trainset};

// 引擎
pub use engine::{
    AiScoreEngine, AlertManager, InductionOrchestrator, MultiObjectiveOptimizer,
    PredictiveMaintenanceModel, ReportEngine,
};

// API
pub use api::FleetApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "地铁列车编组诱导系统";
