// ==========================================
// 地铁列车编组诱导系统 - 应用层
// ==========================================
// 职责: 会话状态, 连接数据源、引擎与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
