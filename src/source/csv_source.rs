// ==========================================
// 地铁列车编组诱导系统 - CSV 车队数据源
// ==========================================
// 职责: 读取扁平化车队 CSV, 导出车队/预测/编组计划 CSV
// 输入: 每行一列车, 表头见 TrainsetRow 字段
// ==========================================

use crate::domain::prediction::{HistoricalMaintenanceRecord, MaintenancePrediction};
use crate::domain::trainset::{
    Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, Trainset,
    WearProfile,
};
use crate::domain::types::{
    CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Recommendation,
};
use crate::engine::report::InductionPlanRow;
use crate::source::{FleetDataSource, SourceError, SourceResult};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ==========================================
// TrainsetRow - CSV 扁平行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainsetRow {
    pub id: String,
    pub rolling_stock: bool,
    pub signalling: bool,
    pub telecom: bool,
    pub fitness_expiry: DateTime<Utc>,
    pub open_job_cards: u32,
    pub job_priority: JobPriority,
    pub maintenance_type: MaintenanceType,
    pub total_km: f64,
    pub since_maintenance_km: f64,
    pub brakes_wear: f64,
    pub bogies_wear: f64,
    pub hvac_wear: f64,
    pub last_maintenance_date: NaiveDate,
    pub advertiser: Option<String>,
    pub contract_value: f64,
    pub hours_required_today: f64,
    pub exposure_deficit_hours: f64,
    pub interior_cleaning: CleaningStatus,
    pub exterior_cleaning: CleaningStatus,
    pub deep_clean_due: bool,
    pub current_bay: String,
    pub optimal_bay: String,
    pub shunting_moves: u32,
    pub status: OperationalStatus,
    pub reliability_score: f64,
}

impl From<&Trainset> for TrainsetRow {
    fn from(t: &Trainset) -> Self {
        Self {
            id: t.id.clone(),
            rolling_stock: t.fitness.rolling_stock,
            signalling: t.fitness.signalling,
            telecom: t.fitness.telecom,
            fitness_expiry: t.fitness.expiry,
            open_job_cards: t.job_cards.open_count,
            job_priority: t.job_cards.priority,
            maintenance_type: t.job_cards.maintenance_type,
            total_km: t.mileage.total_km,
            since_maintenance_km: t.mileage.since_maintenance_km,
            brakes_wear: t.mileage.wear.brakes(),
            bogies_wear: t.mileage.wear.bogies(),
            hvac_wear: t.mileage.wear.hvac(),
            last_maintenance_date: t.mileage.last_maintenance_date,
            advertiser: t.branding.advertiser.clone(),
            contract_value: t.branding.contract_value,
            hours_required_today: t.branding.hours_required_today,
            exposure_deficit_hours: t.branding.exposure_deficit_hours,
            interior_cleaning: t.cleaning.interior,
            exterior_cleaning: t.cleaning.exterior,
            deep_clean_due: t.cleaning.deep_clean_due,
            current_bay: t.stabling.current_bay.clone(),
            optimal_bay: t.stabling.optimal_bay.clone(),
            shunting_moves: t.stabling.shunting_moves,
            status: t.operational.status,
            reliability_score: t.operational.reliability_score,
        }
    }
}

impl TrainsetRow {
    /// 转换为领域对象（越界值钳制, 空广告主视为无广告）
    pub fn into_trainset(self, row: usize) -> SourceResult<Trainset> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(SourceError::Parse {
                row,
                message: "列车编号为空".to_string(),
            });
        }
        let numbers = [
            self.total_km,
            self.since_maintenance_km,
            self.contract_value,
            self.hours_required_today,
            self.exposure_deficit_hours,
            self.reliability_score,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(SourceError::Parse {
                row,
                message: format!("{} 包含非有限数值", id),
            });
        }

        let mut trainset = Trainset {
            id,
            fitness: FitnessCertificates::new(
                self.rolling_stock,
                self.signalling,
                self.telecom,
                self.fitness_expiry,
            ),
            job_cards: JobCards {
                open_count: self.open_job_cards,
                priority: self.job_priority,
                maintenance_type: self.maintenance_type,
            },
            mileage: Mileage {
                total_km: self.total_km,
                since_maintenance_km: self.since_maintenance_km,
                wear: WearProfile::new(self.brakes_wear, self.bogies_wear, self.hvac_wear),
                last_maintenance_date: self.last_maintenance_date,
            },
            branding: Branding {
                advertiser: self.advertiser.filter(|a| !a.trim().is_empty()),
                contract_value: self.contract_value,
                hours_required_today: self.hours_required_today,
                exposure_deficit_hours: self.exposure_deficit_hours,
            },
            cleaning: Cleaning {
                interior: self.interior_cleaning,
                exterior: self.exterior_cleaning,
                deep_clean_due: self.deep_clean_due,
            },
            stabling: Stabling {
                current_bay: self.current_bay,
                optimal_bay: self.optimal_bay,
                shunting_moves: self.shunting_moves,
            },
            operational: Operational {
                status: self.status,
                reliability_score: self.reliability_score,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: None,
        };
        trainset.normalize();
        Ok(trainset)
    }
}

// ==========================================
// CsvFleetSource
// ==========================================
pub struct CsvFleetSource {
    path: PathBuf,
}

impl CsvFleetSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取全部行（列车编号必须唯一）
    fn read_all(&self) -> SourceResult<Vec<Trainset>> {
        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut fleet = Vec::new();
        let mut seen = HashSet::new();
        for (idx, result) in reader.deserialize::<TrainsetRow>().enumerate() {
            // 表头为第 1 行
            let row_no = idx + 2;
            let trainset = result?.into_trainset(row_no)?;
            if !seen.insert(trainset.id.clone()) {
                return Err(SourceError::Parse {
                    row: row_no,
                    message: format!("列车编号重复: {}", trainset.id),
                });
            }
            fleet.push(trainset);
        }
        Ok(fleet)
    }
}

impl FleetDataSource for CsvFleetSource {
    fn source_name(&self) -> &str {
        "csv"
    }

    fn load_fleet(&mut self) -> SourceResult<Vec<Trainset>> {
        let fleet = self.read_all()?;
        info!(path = %self.path.display(), fleet_size = fleet.len(), "CSV 车队加载完成");
        Ok(fleet)
    }

    /// 重新读取文件, 按编号替换记录（保留人工指定）
    fn refresh(&mut self, fleet: &mut [Trainset]) -> SourceResult<usize> {
        let mut latest: HashMap<String, Trainset> = self
            .read_all()?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        let mut updated = 0;
        for trainset in fleet.iter_mut() {
            if let Some(mut fresh) = latest.remove(&trainset.id) {
                fresh.manual_override = trainset.manual_override;
                *trainset = fresh;
                updated += 1;
            }
        }
        if !latest.is_empty() {
            warn!(new_ids = latest.len(), "CSV 中存在车队外的新列车, 刷新时忽略");
        }
        Ok(updated)
    }

    fn historical_records(&mut self) -> SourceResult<Vec<HistoricalMaintenanceRecord>> {
        Ok(Vec::new())
    }
}

// ==========================================
// 导出
// ==========================================

fn write_rows<T: Serialize, P: AsRef<Path>>(path: P, rows: impl IntoIterator<Item = T>) -> SourceResult<usize> {
    let mut writer = Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

pub fn write_fleet_csv<P: AsRef<Path>>(path: P, fleet: &[Trainset]) -> SourceResult<usize> {
    write_rows(path, fleet.iter().map(TrainsetRow::from))
}

pub fn write_predictions_csv<P: AsRef<Path>>(
    path: P,
    predictions: &[MaintenancePrediction],
) -> SourceResult<usize> {
    write_rows(path, predictions)
}

pub fn write_plan_csv<P: AsRef<Path>>(path: P, plan: &[InductionPlanRow]) -> SourceResult<usize> {
    write_rows(path, plan)
}
