// ==========================================
// 地铁列车编组诱导系统 - 告警引擎
// ==========================================
// 职责: 基于阈值生成告警
// 输入: 车队 + 优化结果 + 当前时间
// 输出: Alert 列表
// 说明: 无状态, 每次调用从头生成, 不做去重/滞回
// ==========================================

use crate::config::settings::AlertThresholds;
use crate::domain::alert::Alert;
use crate::domain::trainset::Trainset;
use crate::domain::types::{AlertType, Priority};
use crate::engine::optimizer::OptimizationResult;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

// ==========================================
// AlertManager - 告警引擎
// ==========================================
pub struct AlertManager {
    thresholds: AlertThresholds,
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertThresholds::default())
    }
}

impl AlertManager {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// 生成告警
    ///
    /// 五项独立检查:
    /// 1) 证书 ≤2 天到期（含已过期）→ High
    /// 2) 平均磨损 ≥75% → Critical
    /// 3) 广告曝光欠缺 ≥15h → Medium
    /// 4) 投运列车 <12 → High（车队级）
    /// 5) 存在编组冲突 → High（车队级）
    #[instrument(skip_all, fields(count = trainsets.len()))]
    pub fn check_alerts(
        &self,
        trainsets: &[Trainset],
        optimization_results: &OptimizationResult,
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        for trainset in trainsets {
            // 1. 证书到期
            let days_left = trainset.fitness.days_until_expiry(now);
            if days_left <= t.fitness_expiry_days {
                let message = if days_left < 0 {
                    format!("{} 适用证书已过期 {} 天", trainset.id, -days_left)
                } else {
                    format!("{} 适用证书 {} 天内到期", trainset.id, days_left)
                };
                alerts.push(Alert::new(
                    AlertType::FitnessExpiry,
                    Priority::High,
                    message,
                    Some(&trainset.id),
                    now,
                ));
            }

            // 2. 部件磨损
            let wear_avg = trainset.wear_avg();
            if wear_avg >= t.wear_critical_pct {
                alerts.push(Alert::new(
                    AlertType::ComponentWear,
                    Priority::Critical,
                    format!("{} 平均部件磨损 {:.1}%", trainset.id, wear_avg),
                    Some(&trainset.id),
                    now,
                ));
            }

            // 3. 广告曝光欠缺
            let deficit = trainset.branding.exposure_deficit_hours;
            if deficit >= t.branding_deficit_hours {
                let advertiser = trainset.branding.advertiser.as_deref().unwrap_or("-");
                alerts.push(Alert::new(
                    AlertType::BrandingDeficit,
                    Priority::Medium,
                    format!(
                        "{} 广告({})曝光欠缺 {:.1} 小时",
                        trainset.id, advertiser, deficit
                    ),
                    Some(&trainset.id),
                    now,
                ));
            }
        }

        // 4. 投运数量不足
        if optimization_results.service_count < t.min_service_ready {
            alerts.push(Alert::new(
                AlertType::ServiceShortfall,
                Priority::High,
                format!(
                    "可投运列车 {} 列, 低于最低要求 {} 列",
                    optimization_results.service_count, t.min_service_ready
                ),
                None,
                now,
            ));
        }

        // 5. 编组冲突
        if optimization_results.has_conflicts() {
            alerts.push(Alert::new(
                AlertType::AssignmentConflict,
                Priority::High,
                format!("检测到 {} 条编组冲突", optimization_results.conflicts.len()),
                None,
                now,
            ));
        }

        debug!(alert_count = alerts.len(), "告警检查完成");
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::FleetConstraints;
    use crate::domain::trainset::{
        Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, WearProfile,
    };
    use crate::domain::types::{
        CleaningStatus, JobPriority, MaintenanceType, OperationalStatus, Recommendation,
    };
    use crate::engine::optimizer::MultiObjectiveOptimizer;
    use chrono::{Duration, NaiveDate};

    fn make(id: &str, expiry_days: i64, wear: f64, deficit: f64, now: DateTime<Utc>) -> Trainset {
        Trainset {
            id: id.to_string(),
            fitness: FitnessCertificates::new(true, true, true, now + Duration::days(expiry_days)),
            job_cards: JobCards {
                open_count: 0,
                priority: JobPriority::Low,
                maintenance_type: MaintenanceType::Inspection,
            },
            mileage: Mileage {
                total_km: 60_000.0,
                since_maintenance_km: 1_500.0,
                wear: WearProfile::new(wear, wear, wear),
                last_maintenance_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            },
            branding: Branding {
                advertiser: Some("Acme".to_string()),
                contract_value: 100_000.0,
                hours_required_today: 8.0,
                exposure_deficit_hours: deficit,
            },
            cleaning: Cleaning {
                interior: CleaningStatus::Clean,
                exterior: CleaningStatus::Clean,
                deep_clean_due: false,
            },
            stabling: Stabling {
                current_bay: "B05".to_string(),
                optimal_bay: "B05".to_string(),
                shunting_moves: 0,
            },
            operational: Operational {
                status: OperationalStatus::Available,
                reliability_score: 90.0,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: None,
        }
    }

    #[test]
    fn test_each_threshold_triggers_once() {
        let now = Utc::now();
        let fleet = vec![
            make("TS-01", 1, 10.0, 0.0, now),
            make("TS-02", 20, 80.0, 0.0, now),
            make("TS-03", 20, 10.0, 15.0, now),
            make("TS-04", 20, 10.0, 0.0, now),
        ];
        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(fleet.clone(), &FleetConstraints::default());

        let alerts = AlertManager::default().check_alerts(&fleet, &result, now);

        let of = |kind: AlertType| alerts.iter().filter(|a| a.alert_type == kind).count();
        assert_eq!(of(AlertType::FitnessExpiry), 1);
        assert_eq!(of(AlertType::ComponentWear), 1);
        assert_eq!(of(AlertType::BrandingDeficit), 1);
        // 4 列 < 12
        assert_eq!(of(AlertType::ServiceShortfall), 1);
        assert_eq!(of(AlertType::AssignmentConflict), 0);

        let wear_alert = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::ComponentWear)
            .unwrap();
        assert_eq!(wear_alert.priority, Priority::Critical);
        assert_eq!(wear_alert.trainset_id.as_deref(), Some("TS-02"));
    }

    #[test]
    fn test_expired_certificate_alerts() {
        let now = Utc::now();
        let fleet = vec![make("TS-01", -3, 10.0, 0.0, now)];
        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(fleet.clone(), &FleetConstraints::default());
        let alerts = AlertManager::default().check_alerts(&fleet, &result, now);
        let expiry = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::FitnessExpiry)
            .unwrap();
        assert!(expiry.message.contains("已过期"));
    }

    #[test]
    fn test_stateless_between_calls() {
        let now = Utc::now();
        let fleet = vec![make("TS-01", 1, 90.0, 30.0, now)];
        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(fleet.clone(), &FleetConstraints::default());
        let manager = AlertManager::default();

        let first = manager.check_alerts(&fleet, &result, now);
        let second = manager.check_alerts(&fleet, &result, now);
        assert_eq!(first.len(), second.len());
        assert_eq!(first.len(), 4);
    }
}
