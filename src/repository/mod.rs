// ==========================================
// 地铁列车编组诱导系统 - 数据仓储层
// ==========================================
// 职责: 提供审计日志的数据访问, 屏蔽数据库细节
// 约束: 所有查询使用参数化
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod action_log_repo;
pub mod error;

pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
