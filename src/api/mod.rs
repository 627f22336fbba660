// ==========================================
// 地铁列车编组诱导系统 - API 层
// ==========================================
// 职责: 提供面向调度员/前端的业务接口, 处理函数接收 &mut AppState
// ==========================================

pub mod error;
pub mod fleet_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use fleet_api::{ExportSummary, FleetApi};
