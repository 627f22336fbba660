// ==========================================
// 地铁列车编组诱导系统 - 多目标编组优化器
// ==========================================
// 职责: 加权评分 → 降序排序 → 贪心分配 Service / Standby / IBL
// 输入: 车队列表 + 计数约束
// 输出: OptimizationResult (带标签车队 + 冲突 + 三类计数)
// ==========================================
// 说明: 投运候选 (证书有效且非 IBL) 与入库候选 (证书无效或 IBL 或工单>2)
//       默认可以重叠, 入库分配会覆盖投运标签; 冲突检测负责暴露
//       人工指定等途径造成的不一致。strict_partition=true 时两集合互斥。
// ==========================================

use crate::config::settings::{FleetConstraints, ObjectiveWeights};
use crate::domain::trainset::Trainset;
use crate::domain::types::{OperationalStatus, Recommendation};
use crate::engine::objectives::calculate_objective_scores;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// 入库候选的工单阈值（严格大于）
const IBL_OPEN_JOB_THRESHOLD: u32 = 2;

// ==========================================
// Conflict - 编组冲突
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    InvalidFitness, // 投运但证书无效
    IblStatus,      // 投运但运营状态为 IBL
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::InvalidFitness => write!(f, "INVALID_FITNESS"),
            ConflictKind::IblStatus => write!(f, "IBL_STATUS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub trainset_id: String,
    pub kind: ConflictKind,
    pub message: String,
}

// ==========================================
// OptimizationResult - 优化结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// 按 optimization_score 降序排列的车队
    pub trainsets: Vec<Trainset>,
    pub conflicts: Vec<Conflict>,
    pub service_count: usize,
    pub standby_count: usize,
    pub ibl_count: usize,
}

impl OptimizationResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn fleet_size(&self) -> usize {
        self.trainsets.len()
    }

    pub fn find(&self, trainset_id: &str) -> Option<&Trainset> {
        self.trainsets.iter().find(|t| t.id == trainset_id)
    }
}

// ==========================================
// MultiObjectiveOptimizer - 多目标编组优化器
// ==========================================
pub struct MultiObjectiveOptimizer {
    weights: ObjectiveWeights,
}

impl Default for MultiObjectiveOptimizer {
    fn default() -> Self {
        Self::new(ObjectiveWeights::default())
    }
}

impl MultiObjectiveOptimizer {
    /// 构造函数
    ///
    /// # 参数
    /// - `weights`: 六目标权重（调用方负责 validate）
    pub fn new(weights: ObjectiveWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ObjectiveWeights {
        &self.weights
    }

    /// 单车加权评分
    pub fn calculate_objective_score(&self, trainset: &Trainset) -> f64 {
        calculate_objective_scores(trainset).weighted_sum(&self.weights)
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 车队编组分配
    ///
    /// 步骤:
    /// 1) 每车计算 optimization_score
    /// 2) 按分数降序稳定排序
    /// 3) 全部重置为 Standby
    /// 4) 投运: 证书有效且状态≠IBL, 取前 min(target_service, 候选数)
    /// 5) 入库: 证书无效或状态=IBL或工单>2, 按分数升序取前 min(max_ibl, 候选数)
    /// 6) 人工指定覆盖
    /// 7) 冲突检测: 投运且(证书无效或状态=IBL)
    #[instrument(skip(self, trainsets, constraints), fields(count = trainsets.len()))]
    pub fn optimize_fleet_assignment(
        &self,
        mut trainsets: Vec<Trainset>,
        constraints: &FleetConstraints,
    ) -> OptimizationResult {
        // 1. 加权评分
        for trainset in trainsets.iter_mut() {
            trainset.optimization_score = self.calculate_objective_score(trainset);
        }

        // 2. 降序稳定排序（同分保持原顺序）
        trainsets.sort_by(|a, b| b.optimization_score.total_cmp(&a.optimization_score));

        // 3. 默认备用
        for trainset in trainsets.iter_mut() {
            trainset.recommendation = Recommendation::Standby;
        }

        // 4. 投运分配
        let mut assigned_service = 0usize;
        for trainset in trainsets.iter_mut() {
            if assigned_service >= constraints.target_service {
                break;
            }
            if is_service_candidate(trainset, constraints.strict_partition) {
                trainset.recommendation = Recommendation::Service;
                assigned_service += 1;
            }
        }
        debug!(assigned_service, target = constraints.target_service, "投运分配完成");

        // 5. 入库分配（最差优先）
        let mut ibl_candidates: Vec<usize> = trainsets
            .iter()
            .enumerate()
            .filter(|(_, t)| is_ibl_candidate(t))
            .map(|(idx, _)| idx)
            .collect();
        ibl_candidates.sort_by(|&a, &b| {
            trainsets[a]
                .optimization_score
                .total_cmp(&trainsets[b].optimization_score)
        });
        for &idx in ibl_candidates.iter().take(constraints.max_ibl) {
            if trainsets[idx].recommendation == Recommendation::Service {
                debug!(trainset_id = %trainsets[idx].id, "投运标签被入库分配覆盖");
            }
            trainsets[idx].recommendation = Recommendation::Ibl;
        }

        // 6. 人工指定
        for trainset in trainsets.iter_mut() {
            if let Some(label) = trainset.manual_override {
                trainset.recommendation = label;
            }
        }

        // 7. 冲突检测
        let conflicts = detect_conflicts(&trainsets);
        for conflict in &conflicts {
            warn!(trainset_id = %conflict.trainset_id, kind = %conflict.kind, "编组冲突");
        }

        let (service_count, standby_count, ibl_count) = count_labels(&trainsets);

        info!(
            service_count,
            standby_count,
            ibl_count,
            conflict_count = conflicts.len(),
            "编组分配完成"
        );

        OptimizationResult {
            trainsets,
            conflicts,
            service_count,
            standby_count,
            ibl_count,
        }
    }
}

/// 投运候选判定
fn is_service_candidate(trainset: &Trainset, strict_partition: bool) -> bool {
    let eligible = trainset.fitness.overall_valid()
        && trainset.operational.status != OperationalStatus::Ibl;
    if strict_partition {
        eligible && trainset.job_cards.open_count <= IBL_OPEN_JOB_THRESHOLD
    } else {
        eligible
    }
}

/// 入库候选判定
fn is_ibl_candidate(trainset: &Trainset) -> bool {
    !trainset.fitness.overall_valid()
        || trainset.operational.status == OperationalStatus::Ibl
        || trainset.job_cards.open_count > IBL_OPEN_JOB_THRESHOLD
}

/// 冲突检测: 投运且(证书无效或状态=IBL), 每个违反条件一条
pub fn detect_conflicts(trainsets: &[Trainset]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for trainset in trainsets {
        if trainset.recommendation != Recommendation::Service {
            continue;
        }
        if !trainset.fitness.overall_valid() {
            conflicts.push(Conflict {
                trainset_id: trainset.id.clone(),
                kind: ConflictKind::InvalidFitness,
                message: format!("{} 被安排投运但适用证书无效", trainset.id),
            });
        }
        if trainset.operational.status == OperationalStatus::Ibl {
            conflicts.push(Conflict {
                trainset_id: trainset.id.clone(),
                kind: ConflictKind::IblStatus,
                message: format!("{} 被安排投运但运营状态为 IBL", trainset.id),
            });
        }
    }
    conflicts
}

/// 统计三类标签
pub fn count_labels(trainsets: &[Trainset]) -> (usize, usize, usize) {
    trainsets
        .iter()
        .fold((0, 0, 0), |(s, sb, i), t| match t.recommendation {
            Recommendation::Service => (s + 1, sb, i),
            Recommendation::Standby => (s, sb + 1, i),
            Recommendation::Ibl => (s, sb, i + 1),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trainset::{
        Branding, Cleaning, FitnessCertificates, JobCards, Mileage, Operational, Stabling, WearProfile,
    };
    use crate::domain::types::{CleaningStatus, JobPriority, MaintenanceType};
    use chrono::{NaiveDate, Utc};

    fn make(id: &str, valid: bool, status: OperationalStatus, open_jobs: u32, wear: f64) -> Trainset {
        Trainset {
            id: id.to_string(),
            fitness: FitnessCertificates::new(valid, true, true, Utc::now()),
            job_cards: JobCards {
                open_count: open_jobs,
                priority: JobPriority::Medium,
                maintenance_type: MaintenanceType::Corrective,
            },
            mileage: Mileage {
                total_km: 80_000.0,
                since_maintenance_km: 2_000.0,
                wear: WearProfile::new(wear, wear, wear),
                last_maintenance_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
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
                current_bay: "B01".to_string(),
                optimal_bay: "B01".to_string(),
                shunting_moves: 1,
            },
            operational: Operational {
                status,
                reliability_score: 90.0,
            },
            ai_score: 0.0,
            optimization_score: 0.0,
            recommendation: Recommendation::Standby,
            manual_override: None,
        }
    }

    #[test]
    fn test_counts_sum_to_fleet_size_and_respect_bounds() {
        let fleet = vec![
            make("TS-01", true, OperationalStatus::Available, 0, 10.0),
            make("TS-02", true, OperationalStatus::Available, 0, 20.0),
            make("TS-03", false, OperationalStatus::Available, 0, 30.0),
            make("TS-04", true, OperationalStatus::Ibl, 0, 40.0),
            make("TS-05", true, OperationalStatus::Standby, 4, 50.0),
        ];
        let constraints = FleetConstraints {
            target_service: 2,
            max_ibl: 1,
            strict_partition: false,
        };

        let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);

        assert_eq!(result.service_count + result.standby_count + result.ibl_count, 5);
        assert!(result.service_count <= 2);
        assert!(result.ibl_count <= 1);
        assert!(!result.has_conflicts());
    }

    #[test]
    fn test_sorted_descending_by_optimization_score() {
        let fleet = vec![
            make("TS-01", true, OperationalStatus::Available, 0, 80.0),
            make("TS-02", true, OperationalStatus::Available, 0, 10.0),
            make("TS-03", true, OperationalStatus::Available, 0, 40.0),
        ];
        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(fleet, &FleetConstraints::default());

        let ids: Vec<&str> = result.trainsets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["TS-02", "TS-03", "TS-01"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let fleet = vec![
            make("TS-A", true, OperationalStatus::Available, 0, 20.0),
            make("TS-B", true, OperationalStatus::Available, 0, 20.0),
            make("TS-C", true, OperationalStatus::Available, 0, 20.0),
        ];
        let constraints = FleetConstraints {
            target_service: 1,
            max_ibl: 0,
            strict_partition: false,
        };
        let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);
        assert_eq!(result.trainsets[0].id, "TS-A");
        assert_eq!(result.trainsets[0].recommendation, Recommendation::Service);
        assert_eq!(result.trainsets[1].recommendation, Recommendation::Standby);
    }

    #[test]
    fn test_ibl_overwrites_service_for_open_job_cards() {
        // 证书有效、工单 3 张: 同时属于投运与入库候选
        let fleet = vec![make("TS-01", true, OperationalStatus::Available, 3, 10.0)];
        let constraints = FleetConstraints {
            target_service: 5,
            max_ibl: 5,
            strict_partition: false,
        };
        let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);
        assert_eq!(result.trainsets[0].recommendation, Recommendation::Ibl);
        assert_eq!(result.service_count, 0);
    }

    #[test]
    fn test_strict_partition_keeps_service_slot_for_clean_trainset() {
        let fleet = vec![
            make("TS-01", true, OperationalStatus::Available, 3, 5.0),
            make("TS-02", true, OperationalStatus::Available, 0, 30.0),
        ];
        let constraints = FleetConstraints {
            target_service: 1,
            max_ibl: 0,
            strict_partition: true,
        };
        let result = MultiObjectiveOptimizer::default().optimize_fleet_assignment(fleet, &constraints);
        let ts2 = result.find("TS-02").unwrap();
        assert_eq!(ts2.recommendation, Recommendation::Service);
        assert_eq!(result.find("TS-01").unwrap().recommendation, Recommendation::Standby);
    }

    #[test]
    fn test_manual_override_produces_conflict() {
        let mut bad = make("TS-09", false, OperationalStatus::Ibl, 0, 10.0);
        bad.manual_override = Some(Recommendation::Service);
        let fleet = vec![bad, make("TS-10", true, OperationalStatus::Available, 0, 10.0)];

        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(fleet, &FleetConstraints::default());

        assert_eq!(result.conflicts.len(), 2);
        assert!(result.conflicts.iter().all(|c| c.trainset_id == "TS-09"));
        assert!(result
            .conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::InvalidFitness));
        assert!(result.conflicts.iter().any(|c| c.kind == ConflictKind::IblStatus));
    }

    #[test]
    fn test_empty_fleet() {
        let result = MultiObjectiveOptimizer::default()
            .optimize_fleet_assignment(Vec::new(), &FleetConstraints::default());
        assert_eq!(result.fleet_size(), 0);
        assert_eq!((result.service_count, result.standby_count, result.ibl_count), (0, 0, 0));
    }
}
