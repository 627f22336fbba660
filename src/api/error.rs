// ==========================================
// 地铁列车编组诱导系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 将下层错误转换为用户可读的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::predictor::PredictionError;
use crate::repository::error::RepositoryError;
use crate::source::SourceError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("前置条件未满足: {0}")]
    NotReady(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 配置错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据源与导出
    // ==========================================
    #[error("数据源错误: {0}")]
    DataSourceError(String),

    #[error("导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 预测模型
    // ==========================================
    #[error("训练样本不足: {samples} < {required}")]
    InsufficientTrainingData { samples: usize, required: usize },

    #[error("预测模型错误: {0}")]
    PredictionFailed(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { .. } | ConfigError::WeightsNotNormalized(_) => {
                ApiError::ConfigError(err.to_string())
            }
            ConfigError::Storage(msg) => ApiError::DatabaseError(msg),
            ConfigError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("配置锁获取失败: {}", msg))
            }
            ConfigError::Serialization(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        ApiError::DataSourceError(err.to_string())
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::InsufficientData { samples, required } => {
                ApiError::InsufficientTrainingData { samples, required }
            }
            other => ApiError::PredictionFailed(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
