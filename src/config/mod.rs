// ==========================================
// 地铁列车编组诱导系统 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod error;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader::FleetConfigReader;
pub use error::{ConfigError, ConfigResult};
pub use settings::{AlertThresholds, FleetConstraints, ForestSettings, ObjectiveWeights};
