// ==========================================
// 地铁列车编组诱导系统 - 列车领域模型
// ==========================================
// 职责: 定义 Trainset 及其子记录（证书/工单/里程/广告/保洁/停放/运营）
// 红线: overall_valid 必须等于三项证书的合取, 不单独存储
// 红线: 部件磨损百分比始终位于 [0, 100]
// ==========================================

use crate::domain::types::{
    CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Recommendation,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// FitnessCertificates - 适用证书
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessCertificates {
    pub rolling_stock: bool,     // 车辆证书
    pub signalling: bool,        // 信号证书
    pub telecom: bool,           // 通信证书
    pub expiry: DateTime<Utc>,   // 证书到期时间
}

impl FitnessCertificates {
    pub fn new(rolling_stock: bool, signalling: bool, telecom: bool, expiry: DateTime<Utc>) -> Self {
        Self {
            rolling_stock,
            signalling,
            telecom,
            expiry,
        }
    }

    /// 三项证书全部有效
    pub fn overall_valid(&self) -> bool {
        self.rolling_stock && self.signalling && self.telecom
    }

    /// 距离到期的整天数（已过期为负数）
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry - now).num_days()
    }
}

// ==========================================
// JobCards - 维修工单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCards {
    pub open_count: u32,
    pub priority: JobPriority,
    pub maintenance_type: MaintenanceType,
}

// ==========================================
// WearProfile - 部件磨损
// ==========================================
// 字段私有: 所有写入都经过 clamp（反序列化经 RawWear → new）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWear")]
pub struct WearProfile {
    brakes: f64,
    bogies: f64,
    hvac: f64,
}

#[derive(Deserialize)]
struct RawWear {
    brakes: f64,
    bogies: f64,
    hvac: f64,
}

impl From<RawWear> for WearProfile {
    fn from(raw: RawWear) -> Self {
        Self::new(raw.brakes, raw.bogies, raw.hvac)
    }
}

impl WearProfile {
    pub fn new(brakes: f64, bogies: f64, hvac: f64) -> Self {
        Self {
            brakes: clamp_pct(brakes),
            bogies: clamp_pct(bogies),
            hvac: clamp_pct(hvac),
        }
    }

    pub fn brakes(&self) -> f64 {
        self.brakes
    }

    pub fn bogies(&self) -> f64 {
        self.bogies
    }

    pub fn hvac(&self) -> f64 {
        self.hvac
    }

    /// 三个部件的平均磨损
    pub fn average(&self) -> f64 {
        (self.brakes + self.bogies + self.hvac) / 3.0
    }

    /// 叠加磨损增量（负数表示检修后恢复）
    pub fn add(&mut self, brakes: f64, bogies: f64, hvac: f64) {
        self.brakes = clamp_pct(self.brakes + brakes);
        self.bogies = clamp_pct(self.bogies + bogies);
        self.hvac = clamp_pct(self.hvac + hvac);
    }

    /// 外部导入后重新钳制
    pub fn normalized(self) -> Self {
        Self::new(self.brakes, self.bogies, self.hvac)
    }
}

fn clamp_pct(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

// ==========================================
// Mileage - 里程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mileage {
    pub total_km: f64,
    pub since_maintenance_km: f64,
    pub wear: WearProfile,
    pub last_maintenance_date: NaiveDate,
}

// ==========================================
// Branding - 车身广告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub advertiser: Option<String>,   // 广告主（无广告为 None）
    pub contract_value: f64,          // 合同金额
    pub hours_required_today: f64,    // 当日要求曝光小时数
    pub exposure_deficit_hours: f64,  // 累计曝光欠缺小时数
}

impl Branding {
    pub fn is_branded(&self) -> bool {
        self.advertiser.is_some()
    }
}

// ==========================================
// Cleaning - 保洁
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cleaning {
    pub interior: CleaningStatus,
    pub exterior: CleaningStatus,
    pub deep_clean_due: bool,
}

impl Cleaning {
    pub fn is_fully_clean(&self) -> bool {
        self.interior == CleaningStatus::Clean && self.exterior == CleaningStatus::Clean
    }
}

// ==========================================
// Stabling - 停放
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stabling {
    pub current_bay: String,
    pub optimal_bay: String,
    pub shunting_moves: u32,
}

// ==========================================
// Operational - 运营
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operational {
    pub status: OperationalStatus,
    pub reliability_score: f64, // 0-100
}

// ==========================================
// Trainset - 列车
// ==========================================
// 用途: 数据源生成, 引擎写入 ai_score / optimization_score / recommendation
// 反序列化经 RawTrainset 后统一 normalize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTrainset")]
pub struct Trainset {
    // ===== 主键 =====
    pub id: String,

    // ===== 子记录 =====
    pub fitness: FitnessCertificates,
    pub job_cards: JobCards,
    pub mileage: Mileage,
    pub branding: Branding,
    pub cleaning: Cleaning,
    pub stabling: Stabling,
    pub operational: Operational,

    // ===== 引擎派生字段 =====
    pub ai_score: f64,
    pub optimization_score: f64,
    pub recommendation: Recommendation,
    pub manual_override: Option<Recommendation>,
}

#[derive(Deserialize)]
struct RawTrainset {
    id: String,
    fitness: FitnessCertificates,
    job_cards: JobCards,
    mileage: Mileage,
    branding: Branding,
    cleaning: Cleaning,
    stabling: Stabling,
    operational: Operational,
    #[serde(default)]
    ai_score: f64,
    #[serde(default)]
    optimization_score: f64,
    #[serde(default)]
    recommendation: Recommendation,
    #[serde(default)]
    manual_override: Option<Recommendation>,
}

impl From<RawTrainset> for Trainset {
    fn from(raw: RawTrainset) -> Self {
        let mut trainset = Trainset {
            id: raw.id,
            fitness: raw.fitness,
            job_cards: raw.job_cards,
            mileage: raw.mileage,
            branding: raw.branding,
            cleaning: raw.cleaning,
            stabling: raw.stabling,
            operational: raw.operational,
            ai_score: raw.ai_score,
            optimization_score: raw.optimization_score,
            recommendation: raw.recommendation,
            manual_override: raw.manual_override,
        };
        trainset.normalize();
        trainset
    }
}

impl Trainset {
    /// 平均部件磨损
    pub fn wear_avg(&self) -> f64 {
        self.mileage.wear.average()
    }

    /// 距离上次检修的天数（未来日期按 0 计）
    pub fn days_since_maintenance(&self, today: NaiveDate) -> i64 {
        (today - self.mileage.last_maintenance_date).num_days().max(0)
    }

    /// 钳制外部数据中的越界字段
    pub fn normalize(&mut self) {
        self.mileage.wear = self.mileage.wear.normalized();
        self.operational.reliability_score = clamp_pct(self.operational.reliability_score);
        self.ai_score = clamp_pct(self.ai_score);
        if !self.mileage.since_maintenance_km.is_finite() || self.mileage.since_maintenance_km < 0.0 {
            self.mileage.since_maintenance_km = 0.0;
        }
        if self.branding.exposure_deficit_hours < 0.0 {
            self.branding.exposure_deficit_hours = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wear_profile_clamped() {
        let mut wear = WearProfile::new(120.0, -5.0, 50.0);
        assert_eq!(wear.brakes(), 100.0);
        assert_eq!(wear.bogies(), 0.0);

        wear.add(10.0, 10.0, 60.0);
        assert_eq!(wear.brakes(), 100.0);
        assert_eq!(wear.bogies(), 10.0);
        assert_eq!(wear.hvac(), 100.0);
    }

    #[test]
    fn test_overall_valid_is_conjunction() {
        let now = Utc::now();
        for mask in 0..8u8 {
            let (rs, sig, tel) = (mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);
            let cert = FitnessCertificates::new(rs, sig, tel, now);
            assert_eq!(cert.overall_valid(), rs && sig && tel);
        }
    }

    #[test]
    fn test_deserialize_clamps_wear() {
        let wear: WearProfile =
            serde_json::from_str(r#"{"brakes":250.0,"bogies":-40.0,"hvac":30.0}"#).unwrap();
        assert_eq!(wear.brakes(), 100.0);
        assert_eq!(wear.bogies(), 0.0);
        assert_eq!(wear.hvac(), 30.0);
    }

    #[test]
    fn test_deserialize_normalizes_trainset() {
        let now = Utc::now();
        let trainset = Trainset {
            id: "TS-07".to_string(),
            fitness: FitnessCertificates::new(true, true, true, now),
            job_cards: JobCards {
                open_count: 1,
                priority: JobPriority::Low,
                maintenance_type: MaintenanceType::Inspection,
            },
            mileage: Mileage {
                total_km: 40_000.0,
                since_maintenance_km: 1_200.0,
                wear: WearProfile::new(30.0, 30.0, 30.0),
                last_maintenance_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            },
            branding: Branding {
                advertiser: None,
                contract_value: 0.0,
                hours_required_today: 0.0,
                exposure_deficit_hours: 0.0,
            },
            cleaning: Cleaning {
                interior: CleaningStatus::Clean,
                exterior: CleaningStatus::Clean,
                deep_clean_due: false,
            },
            stabling: Stabling {
                current_bay: "B03".to_string(),
                optimal_bay: "B03".to_string(),
                shunting_moves: 0,
            },
            operational: Operational {
                status: OperationalStatus::Available,
                reliability_score: 88.0,
            },
            ai_score: 70.0,
            optimization_score: 0.5,
            recommendation: Recommendation::Service,
            manual_override: None,
        };

        let mut value = serde_json::to_value(&trainset).unwrap();
        value["mileage"]["wear"]["brakes"] = serde_json::json!(250.0);
        value["mileage"]["wear"]["bogies"] = serde_json::json!(-40.0);
        value["ai_score"] = serde_json::json!(140.0);
        value["operational"]["reliability_score"] = serde_json::json!(-5.0);

        let back: Trainset = serde_json::from_value(value).unwrap();
        assert_eq!(back.mileage.wear.brakes(), 100.0);
        assert_eq!(back.mileage.wear.bogies(), 0.0);
        assert!((0.0..=100.0).contains(&back.wear_avg()));
        assert_eq!(back.ai_score, 100.0);
        assert_eq!(back.operational.reliability_score, 0.0);
        assert_eq!(back.recommendation, Recommendation::Service);
    }

    #[test]
    fn test_days_until_expiry_negative_when_expired() {
        let now = Utc::now();
        let cert = FitnessCertificates::new(true, true, true, now - chrono::Duration::days(3));
        assert_eq!(cert.days_until_expiry(now), -3);
    }
}
