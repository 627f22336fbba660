// ==========================================
// 地铁列车编组诱导系统 - 多目标子评分
// ==========================================
// 职责: 六个子目标评分 (均在 [0, 1]) + 加权汇总
// 子目标: 准点 / 成本 / 广告履约 / 维修风险 / 能耗 / 运营灵活性
// ==========================================

use crate::config::settings::ObjectiveWeights;
use crate::domain::trainset::Trainset;
use crate::domain::types::OperationalStatus;
use serde::{Deserialize, Serialize};

/// 里程归一化基准（km）
const MILEAGE_NORMALIZER_KM: f64 = 10_000.0;
/// 工单归一化基准（张）
const JOB_CARD_NORMALIZER: f64 = 5.0;
/// 广告欠缺归一化基准（小时）
const BRANDING_DEFICIT_NORMALIZER_HOURS: f64 = 20.0;
/// 调车次数归一化基准
const SHUNTING_NORMALIZER: f64 = 5.0;

// ==========================================
// ObjectiveScores - 六目标子评分
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveScores {
    pub punctuality: f64,
    pub cost_efficiency: f64,
    pub branding_compliance: f64,
    pub maintenance_risk: f64,
    pub energy_efficiency: f64,
    pub operational_flexibility: f64,
}

impl ObjectiveScores {
    /// 加权汇总
    pub fn weighted_sum(&self, weights: &ObjectiveWeights) -> f64 {
        self.punctuality * weights.punctuality
            + self.cost_efficiency * weights.cost_efficiency
            + self.branding_compliance * weights.branding_compliance
            + self.maintenance_risk * weights.maintenance_risk
            + self.energy_efficiency * weights.energy_efficiency
            + self.operational_flexibility * weights.operational_flexibility
    }
}

/// 计算六个子目标评分
///
/// 公式:
/// - 准点: reliability/100, 证书无效时减半
/// - 成本: 1 - 0.5×min(1, since_km/10000) - 0.5×min(1, open_jobs/5)
/// - 广告履约: 无广告 0.5; 有广告 0.5 + 0.5×min(1, deficit/20) (欠缺越大越需要上线曝光)
/// - 维修风险: 1 - wear_avg/100 (越高风险越低)
/// - 能耗: 1 - 0.6×hvac/100 - 0.4×min(1, shunting/5)
/// - 运营灵活性: Available 1.0 / Standby 0.8 / Maintenance 0.3 / IBL 0.0, 需深度保洁时 ×0.9
pub fn calculate_objective_scores(trainset: &Trainset) -> ObjectiveScores {
    let reliability = trainset.operational.reliability_score / 100.0;
    let punctuality = if trainset.fitness.overall_valid() {
        reliability
    } else {
        reliability * 0.5
    };

    let mileage_ratio = (trainset.mileage.since_maintenance_km / MILEAGE_NORMALIZER_KM).min(1.0);
    let job_ratio = (trainset.job_cards.open_count as f64 / JOB_CARD_NORMALIZER).min(1.0);
    let cost_efficiency = 1.0 - 0.5 * mileage_ratio - 0.5 * job_ratio;

    let branding_compliance = if trainset.branding.is_branded() {
        0.5 + 0.5
            * (trainset.branding.exposure_deficit_hours / BRANDING_DEFICIT_NORMALIZER_HOURS).min(1.0)
    } else {
        0.5
    };

    let maintenance_risk = 1.0 - trainset.wear_avg() / 100.0;

    let shunting_ratio = (trainset.stabling.shunting_moves as f64 / SHUNTING_NORMALIZER).min(1.0);
    let energy_efficiency = 1.0 - 0.6 * trainset.mileage.wear.hvac() / 100.0 - 0.4 * shunting_ratio;

    let status_factor = match trainset.operational.status {
        OperationalStatus::Available => 1.0,
        OperationalStatus::Standby => 0.8,
        OperationalStatus::Maintenance => 0.3,
        OperationalStatus::Ibl => 0.0,
    };
    let operational_flexibility = if trainset.cleaning.deep_clean_due {
        status_factor * 0.9
    } else {
        status_factor
    };

    ObjectiveScores {
        punctuality: unit(punctuality),
        cost_efficiency: unit(cost_efficiency),
        branding_compliance: unit(branding_compliance),
        maintenance_risk: unit(maintenance_risk),
        energy_efficiency: unit(energy_efficiency),
        operational_flexibility: unit(operational_flexibility),
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trainset::{
        Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, WearProfile,
    };
    use crate::domain::types::{CleaningStatus, JobPriority, MaintenanceType, Recommendation};
    use chrono::{NaiveDate, Utc};

    fn base() -> Trainset {
        Trainset {
            id: "TS-02".to_string(),
            fitness: FitnessCertificates::new(true, true, true, Utc::now()),
            job_cards: JobCards {
                open_count: 0,
                priority: JobPriority::Low,
                maintenance_type: MaintenanceType::Preventive,
            },
            mileage: Mileage {
                total_km: 50_000.0,
                since_maintenance_km: 0.0,
                wear: WearProfile::new(0.0, 0.0, 0.0),
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
                current_bay: "B02".to_string(),
                optimal_bay: "B02".to_string(),
                shunting_moves: 0,
            },
            operational: Operational {
                status: OperationalStatus::Available,
                reliability_score: 100.0,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: None,
        }
    }

    #[test]
    fn test_ideal_trainset_scores() {
        let scores = calculate_objective_scores(&base());
        assert_eq!(scores.punctuality, 1.0);
        assert_eq!(scores.cost_efficiency, 1.0);
        assert_eq!(scores.branding_compliance, 0.5);
        assert_eq!(scores.maintenance_risk, 1.0);
        assert_eq!(scores.energy_efficiency, 1.0);
        assert_eq!(scores.operational_flexibility, 1.0);

        // 0.25 + 0.20 + 0.075 + 0.20 + 0.10 + 0.10
        let total = scores.weighted_sum(&ObjectiveWeights::default());
        assert!((total - 0.925).abs() < 1e-9);
    }

    #[test]
    fn test_all_sub_scores_within_unit_interval() {
        let mut ts = base();
        ts.job_cards.open_count = 40;
        ts.mileage.since_maintenance_km = 90_000.0;
        ts.stabling.shunting_moves = 12;
        ts.mileage.wear = WearProfile::new(100.0, 100.0, 100.0);
        ts.operational.status = OperationalStatus::Ibl;
        ts.branding.advertiser = Some("Acme".to_string());
        ts.branding.exposure_deficit_hours = 400.0;

        let s = calculate_objective_scores(&ts);
        for v in [
            s.punctuality,
            s.cost_efficiency,
            s.branding_compliance,
            s.maintenance_risk,
            s.energy_efficiency,
            s.operational_flexibility,
        ] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(s.branding_compliance, 1.0);
        assert_eq!(s.operational_flexibility, 0.0);
    }

    #[test]
    fn test_invalid_fitness_halves_punctuality() {
        let mut ts = base();
        ts.operational.reliability_score = 80.0;
        ts.fitness.telecom = false;
        let s = calculate_objective_scores(&ts);
        assert!((s.punctuality - 0.4).abs() < 1e-9);
    }
}
