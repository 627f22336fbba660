// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use metro_fleet_dss::domain::trainset::{
    Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, Trainset,
    WearProfile,
};
use metro_fleet_dss::domain::types::{
    CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Recommendation,
};

/// 固定评估时间, 保证证书到期等计算可复现
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 21, 0, 0).unwrap()
}

pub fn reference_today() -> NaiveDate {
    reference_now().date_naive()
}

// ==========================================
// Trainset 构建器
// ==========================================
// 默认: 证书全有效、30 天后到期、无工单、磨损 20%、可用、可靠性 90、无广告

pub struct TrainsetBuilder {
    id: String,
    certs: (bool, bool, bool),
    expiry_days: i64,
    open_jobs: u32,
    wear: (f64, f64, f64),
    since_maintenance_km: f64,
    days_since_maintenance: i64,
    advertiser: Option<String>,
    deficit_hours: f64,
    clean: bool,
    deep_clean_due: bool,
    shunting_moves: u32,
    status: OperationalStatus,
    reliability: f64,
    manual_override: Option<Recommendation>,
}

impl TrainsetBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            certs: (true, true, true),
            expiry_days: 30,
            open_jobs: 0,
            wear: (20.0, 20.0, 20.0),
            since_maintenance_km: 2_000.0,
            days_since_maintenance: 7,
            advertiser: None,
            deficit_hours: 0.0,
            clean: true,
            deep_clean_due: false,
            shunting_moves: 0,
            status: OperationalStatus::Available,
            reliability: 90.0,
            manual_override: None,
        }
    }

    pub fn invalid_fitness(mut self) -> Self {
        self.certs = (true, false, true);
        self
    }

    pub fn expiry_in_days(mut self, days: i64) -> Self {
        self.expiry_days = days;
        self
    }

    pub fn open_jobs(mut self, count: u32) -> Self {
        self.open_jobs = count;
        self
    }

    pub fn wear(mut self, pct: f64) -> Self {
        self.wear = (pct, pct, pct);
        self
    }

    pub fn since_maintenance_km(mut self, km: f64) -> Self {
        self.since_maintenance_km = km;
        self
    }

    pub fn days_since_maintenance(mut self, days: i64) -> Self {
        self.days_since_maintenance = days;
        self
    }

    pub fn branded(mut self, advertiser: &str, deficit_hours: f64) -> Self {
        self.advertiser = Some(advertiser.to_string());
        self.deficit_hours = deficit_hours;
        self
    }

    pub fn dirty(mut self) -> Self {
        self.clean = false;
        self
    }

    pub fn deep_clean_due(mut self) -> Self {
        self.deep_clean_due = true;
        self
    }

    pub fn shunting_moves(mut self, moves: u32) -> Self {
        self.shunting_moves = moves;
        self
    }

    pub fn status(mut self, status: OperationalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn reliability(mut self, score: f64) -> Self {
        self.reliability = score;
        self
    }

    pub fn manual_override(mut self, label: Recommendation) -> Self {
        self.manual_override = Some(label);
        self
    }

    pub fn build(self) -> Trainset {
        let now = reference_now();
        let cleaning_status = if self.clean {
            CleaningStatus::Clean
        } else {
            CleaningStatus::RequiresCleaning
        };
        let job_priority = match self.open_jobs {
            0 | 1 => JobPriority::Low,
            2 => JobPriority::Medium,
            3 => JobPriority::High,
            _ => JobPriority::Critical,
        };

        Trainset {
            id: self.id,
            fitness: FitnessCertificates::new(
                self.certs.0,
                self.certs.1,
                self.certs.2,
                now + Duration::days(self.expiry_days),
            ),
            job_cards: JobCards {
                open_count: self.open_jobs,
                priority: job_priority,
                maintenance_type: MaintenanceType::Inspection,
            },
            mileage: Mileage {
                total_km: 80_000.0,
                since_maintenance_km: self.since_maintenance_km,
                wear: WearProfile::new(self.wear.0, self.wear.1, self.wear.2),
                last_maintenance_date: reference_today() - Duration::days(self.days_since_maintenance),
            },
            branding: Branding {
                contract_value: if self.advertiser.is_some() { 200_000.0 } else { 0.0 },
                hours_required_today: if self.advertiser.is_some() { 8.0 } else { 0.0 },
                advertiser: self.advertiser,
                exposure_deficit_hours: self.deficit_hours,
            },
            cleaning: Cleaning {
                interior: cleaning_status,
                exterior: cleaning_status,
                deep_clean_due: self.deep_clean_due,
            },
            stabling: Stabling {
                current_bay: "B01".to_string(),
                optimal_bay: if self.shunting_moves == 0 { "B01" } else { "B09" }.to_string(),
                shunting_moves: self.shunting_moves,
            },
            operational: Operational {
                status: self.status,
                reliability_score: self.reliability,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: self.manual_override,
        }
    }
}

/// 生成 n 列默认健康列车, 可靠性递减以便区分排序
pub fn healthy_fleet(n: usize) -> Vec<Trainset> {
    (1..=n)
        .map(|i| {
            TrainsetBuilder::new(&format!("TS-{:02}", i))
                .reliability(99.0 - i as f64)
                .build()
        })
        .collect()
}
