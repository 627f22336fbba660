// ==========================================
// 地铁列车编组诱导系统 - 模拟车队数据源
// ==========================================
// 职责: 基于种子随机数生成车队、增量刷新、历史样本
// 说明: 磨损为主因子, 里程/工单/可靠性与磨损相关
// 说明: 同一 seed + reference_time 生成结果完全一致
// ==========================================

use crate::domain::prediction::HistoricalMaintenanceRecord;
use crate::domain::trainset::{
    Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, Trainset,
    WearProfile,
};
use crate::domain::types::{
    CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Recommendation,
};
use crate::source::{FleetDataSource, SourceResult};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

pub const DEFAULT_FLEET_SIZE: usize = 25;
pub const DEFAULT_HISTORY_SIZE: usize = 200;

/// 日均运行里程（km）
const DAILY_KM: f64 = 300.0;
const BAY_COUNT: u32 = 30;

const ADVERTISERS: &[&str] = &[
    "Kerala Tourism",
    "Lulu Mall",
    "Malabar Gold",
    "Federal Bank",
    "Milma",
    "Kalyan Silks",
];

const MAINTENANCE_TYPES: &[MaintenanceType] = &[
    MaintenanceType::Preventive,
    MaintenanceType::Corrective,
    MaintenanceType::Inspection,
    MaintenanceType::Overhaul,
];

// ==========================================
// SyntheticFleetSource
// ==========================================
pub struct SyntheticFleetSource {
    fleet_size: usize,
    history_size: usize,
    reference_time: DateTime<Utc>,
    rng: StdRng,
}

impl SyntheticFleetSource {
    pub fn new(fleet_size: usize, seed: u64) -> Self {
        Self {
            fleet_size,
            history_size: DEFAULT_HISTORY_SIZE,
            reference_time: Utc::now(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 固定生成时间基准（测试/复现用）
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = reference_time;
        self
    }

    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }

    pub fn fleet_size(&self) -> usize {
        self.fleet_size
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// 生成单列车
    fn generate_trainset(&mut self, id: String, now: DateTime<Utc>) -> Trainset {
        let rng = &mut self.rng;

        // 磨损主因子
        let base_wear: f64 = rng.gen_range(5.0..85.0);
        let wear = WearProfile::new(
            base_wear + rng.gen_range(-10.0..10.0),
            base_wear + rng.gen_range(-10.0..10.0),
            base_wear + rng.gen_range(-10.0..10.0),
        );

        let since_maintenance_km = base_wear / 100.0 * 10_000.0 + rng.gen_range(0.0..1_500.0);
        let days_since = (since_maintenance_km / DAILY_KM).round() as i64;
        let last_maintenance_date = (now - Duration::days(days_since)).date_naive();

        let fitness = FitnessCertificates::new(
            rng.gen_bool(0.92),
            rng.gen_bool(0.95),
            rng.gen_bool(0.95),
            now + Duration::days(rng.gen_range(-2..=30)),
        );

        let open_count = (base_wear / 25.0) as u32 + rng.gen_range(0..=2);
        let job_priority = match open_count {
            0 | 1 => JobPriority::Low,
            2 => JobPriority::Medium,
            3 => JobPriority::High,
            _ => JobPriority::Critical,
        };
        let maintenance_type = *MAINTENANCE_TYPES
            .choose(rng)
            .unwrap_or(&MaintenanceType::Inspection);

        let branding = if rng.gen_bool(0.6) {
            Branding {
                advertiser: ADVERTISERS.choose(rng).map(|s| s.to_string()),
                contract_value: rng.gen_range(50_000.0..500_000.0),
                hours_required_today: rng.gen_range(4.0..12.0),
                exposure_deficit_hours: rng.gen_range(0.0..25.0),
            }
        } else {
            Branding {
                advertiser: None,
                contract_value: 0.0,
                hours_required_today: 0.0,
                exposure_deficit_hours: 0.0,
            }
        };

        let cleaning_status = |rng: &mut StdRng, p_clean: f64| {
            if rng.gen_bool(p_clean) {
                CleaningStatus::Clean
            } else {
                CleaningStatus::RequiresCleaning
            }
        };
        let cleaning = Cleaning {
            interior: cleaning_status(rng, 0.8),
            exterior: cleaning_status(rng, 0.7),
            deep_clean_due: rng.gen_bool(0.15),
        };

        let current_bay = rng.gen_range(1..=BAY_COUNT);
        let optimal_bay = rng.gen_range(1..=BAY_COUNT);
        let shunting_moves = if current_bay == optimal_bay {
            0
        } else {
            rng.gen_range(1..=4)
        };

        let status = if !fitness.overall_valid() && rng.gen_bool(0.5) {
            OperationalStatus::Maintenance
        } else {
            match rng.gen_range(0..100) {
                0..=7 => OperationalStatus::Ibl,
                8..=17 => OperationalStatus::Maintenance,
                18..=32 => OperationalStatus::Standby,
                _ => OperationalStatus::Available,
            }
        };
        let reliability_score = 100.0 - base_wear * 0.4 + rng.gen_range(-5.0..5.0);

        let mut trainset = Trainset {
            id,
            fitness,
            job_cards: JobCards {
                open_count,
                priority: job_priority,
                maintenance_type,
            },
            mileage: Mileage {
                total_km: rng.gen_range(50_000.0..200_000.0),
                since_maintenance_km,
                wear,
                last_maintenance_date,
            },
            branding,
            cleaning,
            stabling: Stabling {
                current_bay: format!("B{:02}", current_bay),
                optimal_bay: format!("B{:02}", optimal_bay),
                shunting_moves,
            },
            operational: Operational {
                status,
                reliability_score,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: None,
        };
        trainset.normalize();
        trainset
    }
}

/// 维修紧迫度（0-30）: 磨损/里程/工单/证书综合
fn maintenance_urgency(trainset: &Trainset, noise: f64) -> f64 {
    let cert_penalty = if trainset.fitness.overall_valid() { 0.0 } else { 3.0 };
    let urgency = trainset.wear_avg() * 0.25
        + (trainset.mileage.since_maintenance_km / 10_000.0).min(1.0) * 5.0
        + trainset.job_cards.open_count as f64 * 0.8
        + cert_penalty
        + noise;
    urgency.clamp(0.0, 30.0)
}

impl FleetDataSource for SyntheticFleetSource {
    fn source_name(&self) -> &str {
        "synthetic"
    }

    fn load_fleet(&mut self) -> SourceResult<Vec<Trainset>> {
        let now = self.reference_time;
        let fleet: Vec<Trainset> = (1..=self.fleet_size)
            .map(|i| self.generate_trainset(format!("TS-{:02}", i), now))
            .collect();
        info!(fleet_size = fleet.len(), "模拟车队生成完成");
        Ok(fleet)
    }

    fn refresh(&mut self, fleet: &mut [Trainset]) -> SourceResult<usize> {
        let rng = &mut self.rng;
        for trainset in fleet.iter_mut() {
            let km = rng.gen_range(150.0..450.0);
            trainset.mileage.total_km += km;
            trainset.mileage.since_maintenance_km += km;
            trainset.mileage.wear.add(
                rng.gen_range(0.0..1.5),
                rng.gen_range(0.0..1.5),
                rng.gen_range(0.0..1.5),
            );

            if rng.gen_bool(0.1) {
                trainset.job_cards.open_count += 1;
            } else if rng.gen_bool(0.1) {
                trainset.job_cards.open_count = trainset.job_cards.open_count.saturating_sub(1);
            }

            trainset.operational.reliability_score += rng.gen_range(-1.0..1.0);
            if trainset.branding.is_branded() {
                trainset.branding.exposure_deficit_hours += rng.gen_range(-2.0..3.0);
            }
            trainset.normalize();
        }
        debug!(count = fleet.len(), "模拟车队刷新完成");
        Ok(fleet.len())
    }

    fn historical_records(&mut self) -> SourceResult<Vec<HistoricalMaintenanceRecord>> {
        let mut records = Vec::with_capacity(self.history_size);
        for i in 0..self.history_size {
            let observed = self.reference_time - Duration::days(self.rng.gen_range(1..365));
            let snapshot = self.generate_trainset(format!("H-{:04}", i + 1), observed);
            let noise = self.rng.gen_range(-2.0..2.0);
            records.push(HistoricalMaintenanceRecord {
                maintenance_urgency: maintenance_urgency(&snapshot, noise),
                observed_on: observed.date_naive(),
                snapshot,
            });
        }
        debug!(samples = records.len(), "模拟历史样本生成完成");
        Ok(records)
    }
}
