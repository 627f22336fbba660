// ==========================================
// MultiObjectiveOptimizer 引擎集成测试
// ==========================================
// 测试目标: 标签计数守恒、数量上限、投运/入库重叠、人工指定与冲突
// ==========================================

mod helpers;

use helpers::mock_config::MockConfig;
use helpers::test_data_builder::{healthy_fleet, reference_now, TrainsetBuilder};
use metro_fleet_dss::config::FleetConfigReader;
use metro_fleet_dss::domain::types::{OperationalStatus, Recommendation};
use metro_fleet_dss::engine::{ConflictKind, MultiObjectiveOptimizer};
use metro_fleet_dss::source::{FleetDataSource, SyntheticFleetSource};

#[tokio::test]
async fn test_counts_conserved_and_bounded() {
    let config = MockConfig::default();
    let constraints = config.get_fleet_constraints().await.unwrap();
    let optimizer = MultiObjectiveOptimizer::new(config.get_objective_weights().await.unwrap());

    for seed in 0..5 {
        let fleet = SyntheticFleetSource::new(25, seed)
            .with_reference_time(reference_now())
            .load_fleet()
            .unwrap();
        let result = optimizer.optimize_fleet_assignment(fleet, &constraints);

        assert_eq!(
            result.service_count + result.standby_count + result.ibl_count,
            25
        );
        assert!(result.service_count <= constraints.target_service);
        assert!(result.ibl_count <= constraints.max_ibl);
    }
}

#[tokio::test]
async fn test_sorted_descending_by_optimization_score() {
    let config = MockConfig::default();
    let optimizer = MultiObjectiveOptimizer::default();
    let fleet = SyntheticFleetSource::new(20, 9)
        .with_reference_time(reference_now())
        .load_fleet()
        .unwrap();

    let result = optimizer
        .optimize_fleet_assignment(fleet, &config.get_fleet_constraints().await.unwrap());
    for pair in result.trainsets.windows(2) {
        assert!(pair[0].optimization_score >= pair[1].optimization_score);
    }
}

#[test]
fn test_service_limited_to_target() {
    let constraints = MockConfig::with_counts(3, 4).constraints;
    let result =
        MultiObjectiveOptimizer::default().optimize_fleet_assignment(healthy_fleet(6), &constraints);

    assert_eq!(result.service_count, 3);
    assert_eq!(result.standby_count, 3);
    assert_eq!(result.ibl_count, 0);
    assert!(!result.has_conflicts());
}

#[test]
fn test_default_mode_lets_ibl_overwrite_service() {
    let mut fleet = healthy_fleet(4);
    fleet.push(TrainsetBuilder::new("TS-JOBS").open_jobs(3).build());

    // max_ibl = 0: 工单多但证书有效的列车进入投运
    let no_ibl = MockConfig::with_counts(18, 0).constraints;
    let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet.clone(), &no_ibl);
    assert_eq!(result.find("TS-JOBS").unwrap().recommendation, Recommendation::Service);

    // max_ibl = 4: 入库分配覆盖投运标签
    let with_ibl = MockConfig::with_counts(18, 4).constraints;
    let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &with_ibl);
    assert_eq!(result.find("TS-JOBS").unwrap().recommendation, Recommendation::Ibl);
    assert_eq!(result.service_count, 4);
    assert!(!result.has_conflicts());
}

#[test]
fn test_strict_partition_keeps_candidate_sets_disjoint() {
    let mut fleet = healthy_fleet(4);
    fleet.push(TrainsetBuilder::new("TS-JOBS").open_jobs(3).build());

    let strict = MockConfig::with_counts(18, 0).strict().constraints;
    let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &strict);

    assert_eq!(result.find("TS-JOBS").unwrap().recommendation, Recommendation::Standby);
    assert_eq!(result.service_count, 4);
}

#[test]
fn test_invalid_and_ibl_status_never_service_without_override() {
    let mut fleet = healthy_fleet(3);
    fleet.push(TrainsetBuilder::new("TS-CERT").invalid_fitness().build());
    fleet.push(TrainsetBuilder::new("TS-IBL").status(OperationalStatus::Ibl).build());

    let constraints = MockConfig::with_counts(18, 0).constraints;
    let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);

    assert_ne!(result.find("TS-CERT").unwrap().recommendation, Recommendation::Service);
    assert_ne!(result.find("TS-IBL").unwrap().recommendation, Recommendation::Service);
    assert!(result.conflicts.is_empty());
}

#[test]
fn test_manual_override_applied_last_and_conflicts_detected() {
    let mut fleet = healthy_fleet(3);
    fleet.push(
        TrainsetBuilder::new("TS-CERT")
            .invalid_fitness()
            .status(OperationalStatus::Ibl)
            .manual_override(Recommendation::Service)
            .build(),
    );
    fleet.push(
        TrainsetBuilder::new("TS-HOLD")
            .manual_override(Recommendation::Ibl)
            .build(),
    );

    let constraints = MockConfig::default().constraints;
    let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);

    assert_eq!(result.find("TS-CERT").unwrap().recommendation, Recommendation::Service);
    assert_eq!(result.find("TS-HOLD").unwrap().recommendation, Recommendation::Ibl);

    // 证书无效 + IBL 状态 → 两条冲突
    assert_eq!(result.conflicts.len(), 2);
    assert!(result.conflicts.iter().all(|c| c.trainset_id == "TS-CERT"));
    assert!(result
        .conflicts
        .iter()
        .any(|c| c.kind == ConflictKind::InvalidFitness));
    assert!(result.conflicts.iter().any(|c| c.kind == ConflictKind::IblStatus));
}

#[test]
fn test_empty_fleet() {
    let result = MultiObjectiveOptimizer::default()
        .optimize_fleet_assignment(Vec::new(), &MockConfig::default().constraints);
    assert_eq!(result.fleet_size(), 0);
    assert_eq!(result.service_count + result.standby_count + result.ibl_count, 0);
    assert!(!result.has_conflicts());
}
