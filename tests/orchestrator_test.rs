// ==========================================
// InductionOrchestrator 集成测试
// ==========================================
// 测试目标: 评分 → 优化 → 预测 → 告警 → 报告 全链路一致性
// ==========================================

mod helpers;

use helpers::mock_config::MockConfig;
use helpers::test_data_builder::{healthy_fleet, reference_now, TrainsetBuilder};
use metro_fleet_dss::config::FleetConfigReader;
use metro_fleet_dss::domain::types::Recommendation;
use metro_fleet_dss::engine::{InductionOrchestrator, PredictiveMaintenanceModel};
use metro_fleet_dss::source::{FleetDataSource, SyntheticFleetSource};

#[tokio::test]
async fn test_full_run_on_synthetic_fleet() {
    let config = MockConfig::default();
    let orchestrator = InductionOrchestrator::new(
        config.get_objective_weights().await.unwrap(),
        config.get_alert_thresholds().await.unwrap(),
    );
    let fleet = SyntheticFleetSource::new(25, 42)
        .with_reference_time(reference_now())
        .load_fleet()
        .unwrap();

    let outcome = orchestrator.run(
        fleet,
        &config.get_fleet_constraints().await.unwrap(),
        &PredictiveMaintenanceModel::default(),
        reference_now(),
    );
    let report = &outcome.report;

    assert_eq!(report.fleet_size, 25);
    assert_eq!(report.service_count + report.standby_count + report.ibl_count, 25);
    assert_eq!(report.service_count, outcome.optimization.service_count);
    assert_eq!(report.conflict_count, outcome.optimization.conflicts.len());
    assert_eq!(outcome.predictions.len(), 25);

    assert_eq!(report.plan.len(), 25);
    for (idx, row) in report.plan.iter().enumerate() {
        assert_eq!(row.rank, idx + 1);
        assert!(row.risk_score.is_some());
    }

    let alert_total: usize = report.alert_counts.values().sum();
    assert_eq!(alert_total, outcome.alerts.len());
    for key in ["Critical", "High", "Medium", "Low"] {
        assert!(report.alert_counts.contains_key(key), "missing {}", key);
    }
}

#[test]
fn test_report_aggregates() {
    let mut fleet = healthy_fleet(2);
    fleet.push(
        TrainsetBuilder::new("TS-AD")
            .branded("Lulu Mall", 6.0)
            .shunting_moves(2)
            .build(),
    );

    let outcome = InductionOrchestrator::default().run(
        fleet,
        &MockConfig::default().constraints,
        &PredictiveMaintenanceModel::default(),
        reference_now(),
    );
    let report = &outcome.report;

    assert_eq!(report.branded_count, 1);
    assert_eq!(report.total_branding_deficit_hours, 6.0);
    assert_eq!(report.total_shunting_moves, 2);
    assert_eq!(report.fitness_compliance_pct, 100.0);
    assert!((report.avg_wear_pct - 20.0).abs() < 1e-9);
    assert!(report.high_risk_trainsets.is_empty());
}

#[test]
fn test_manual_override_visible_in_plan() {
    let mut fleet = healthy_fleet(3);
    fleet.push(
        TrainsetBuilder::new("TS-HOLD")
            .manual_override(Recommendation::Ibl)
            .build(),
    );

    let outcome = InductionOrchestrator::default().run(
        fleet,
        &MockConfig::default().constraints,
        &PredictiveMaintenanceModel::default(),
        reference_now(),
    );
    let row = outcome
        .report
        .plan
        .iter()
        .find(|r| r.trainset_id == "TS-HOLD")
        .unwrap();

    assert!(row.manual_override);
    assert_eq!(row.recommendation, Recommendation::Ibl);
}

#[test]
fn test_empty_fleet_report() {
    let outcome = InductionOrchestrator::default().run(
        Vec::new(),
        &MockConfig::default().constraints,
        &PredictiveMaintenanceModel::default(),
        reference_now(),
    );

    assert_eq!(outcome.report.fleet_size, 0);
    assert_eq!(outcome.report.avg_ai_score, 0.0);
    assert!(outcome.report.plan.is_empty());
    assert!(outcome.predictions.is_empty());
}
