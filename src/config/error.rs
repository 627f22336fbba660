// ==========================================
// 地铁列车编组诱导系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("目标权重之和必须为 1.0, 实际为 {0:.4}")]
    WeightsNotNormalized(f64),

    #[error("配置存储访问失败: {0}")]
    Storage(String),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Storage(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
