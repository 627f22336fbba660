// ==========================================
// 地铁列车编组诱导系统 - 车队数据源
// ==========================================
// 职责: 定义车队数据源接口（不包含业务规则）
// 实现者: SyntheticFleetSource（模拟）, CsvFleetSource（CSV 文件）
// ==========================================

pub mod csv_source;
pub mod synthetic;

use crate::domain::prediction::HistoricalMaintenanceRecord;
use crate::domain::trainset::Trainset;
use thiserror::Error;

pub use csv_source::{write_fleet_csv, write_plan_csv, write_predictions_csv, CsvFleetSource, TrainsetRow};
pub use synthetic::SyntheticFleetSource;

// ==========================================
// SourceError - 数据源错误
// ==========================================
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("数据解析失败 (行 {row}): {message}")]
    Parse { row: usize, message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

// ==========================================
// FleetDataSource Trait
// ==========================================
pub trait FleetDataSource: Send + Sync {
    /// 数据源名称（日志/审计用）
    fn source_name(&self) -> &str;

    /// 加载完整车队
    fn load_fleet(&mut self) -> SourceResult<Vec<Trainset>>;

    /// 刷新车队（传感器/检修数据更新）
    ///
    /// # 返回
    /// - Ok(n): 被更新的列车数量
    ///
    /// # 说明
    /// - 原地修改, 保留引擎派生字段和人工指定
    fn refresh(&mut self, fleet: &mut [Trainset]) -> SourceResult<usize>;

    /// 历史维修样本（用于训练预测模型, 可为空）
    fn historical_records(&mut self) -> SourceResult<Vec<HistoricalMaintenanceRecord>>;
}
