// ==========================================
// 地铁列车编组诱导系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod alert;
pub mod prediction;
pub mod trainset;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use alert::Alert;
pub use prediction::{HistoricalMaintenanceRecord, MaintenancePrediction, PredictionSource};
pub use trainset::{
    Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, Trainset,
    WearProfile,
};
pub use types::{
    AlertType, CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Priority,
    Recommendation,
};
