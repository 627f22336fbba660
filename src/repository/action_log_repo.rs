// ==========================================
// 地铁列车编组诱导系统 - 操作日志数据仓储
// ==========================================
// 对齐: db.rs action_log 表
// 红线: 人工指定/撤销、诱导执行、模型训练、配置更新必须记录
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
