// ==========================================
// 地铁列车编组诱导系统 - AI 评分引擎
// ==========================================
// 职责: 单车启发式评分 (0-100) + 可解释原因
// 输入: Trainset
// 输出: (ai_score, reasons)
// 红线: 纯函数, 无随机性; 每条规则必须输出 reason
// ==========================================

use crate::domain::trainset::Trainset;
use tracing::instrument;

/// 起始分
const BASE_SCORE: f64 = 100.0;
/// 证书无效扣分
const FITNESS_PENALTY: f64 = 30.0;
/// 每张未关闭工单扣分
const JOB_CARD_PENALTY_EACH: f64 = 5.0;
/// 工单扣分上限
const JOB_CARD_PENALTY_CAP: f64 = 20.0;
/// 平均磨损阈值（严格大于）
const WEAR_THRESHOLD_PCT: f64 = 70.0;
const WEAR_PENALTY: f64 = 20.0;
const CLEANING_PENALTY: f64 = 10.0;
/// 可靠性基准线
const RELIABILITY_BASELINE: f64 = 70.0;
/// 广告曝光欠缺阈值（严格大于, 小时）
const BRANDING_DEFICIT_THRESHOLD_HOURS: f64 = 10.0;
const BRANDING_PENALTY: f64 = 10.0;

// ==========================================
// AiScoreEngine - AI 评分引擎
// ==========================================
pub struct AiScoreEngine {
    // 无状态引擎,不需要注入依赖
}

impl Default for AiScoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AiScoreEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 计算单车评分
    ///
    /// 规则（按顺序执行, 每条规则输出一条 reason）:
    /// 1) 证书无效 → -30
    /// 2) 工单 → -min(20, open_jobs × 5)
    /// 3) 平均磨损 > 70 → -20
    /// 4) 内外保洁未全部完成 → -10
    /// 5) 可靠性 → + floor((reliability - 70) / 2), 可为负
    /// 6) 广告曝光欠缺 > 10h → -10
    /// 最后钳制到 [0, 100]
    pub fn calculate_ai_score(&self, trainset: &Trainset) -> (f64, Vec<String>) {
        let mut score = BASE_SCORE;
        let mut reasons = Vec::with_capacity(6);

        // 规则1: 适用证书
        if trainset.fitness.overall_valid() {
            reasons.push("适用证书全部有效".to_string());
        } else {
            score -= FITNESS_PENALTY;
            reasons.push(format!("适用证书无效 (-{})", FITNESS_PENALTY));
        }

        // 规则2: 未关闭工单
        let open_jobs = trainset.job_cards.open_count;
        let job_penalty = (open_jobs as f64 * JOB_CARD_PENALTY_EACH).min(JOB_CARD_PENALTY_CAP);
        if open_jobs == 0 {
            reasons.push("无未关闭工单".to_string());
        } else {
            score -= job_penalty;
            reasons.push(format!("未关闭工单 {} 张 (-{})", open_jobs, job_penalty));
        }

        // 规则3: 部件磨损
        let wear_avg = trainset.wear_avg();
        if wear_avg > WEAR_THRESHOLD_PCT {
            score -= WEAR_PENALTY;
            reasons.push(format!("平均部件磨损 {:.1}% 超过 {}% (-{})", wear_avg, WEAR_THRESHOLD_PCT, WEAR_PENALTY));
        } else {
            reasons.push(format!("平均部件磨损 {:.1}% 正常", wear_avg));
        }

        // 规则4: 保洁
        if trainset.cleaning.is_fully_clean() {
            reasons.push("内外保洁完成".to_string());
        } else {
            score -= CLEANING_PENALTY;
            reasons.push(format!("保洁未完成 (-{})", CLEANING_PENALTY));
        }

        // 规则5: 可靠性（向下取整, 与整除语义一致）
        let reliability = trainset.operational.reliability_score;
        let reliability_adj = ((reliability - RELIABILITY_BASELINE) / 2.0).floor();
        score += reliability_adj;
        reasons.push(format!("可靠性 {:.0} 调整 {:+}", reliability, reliability_adj));

        // 规则6: 广告曝光欠缺
        let deficit = trainset.branding.exposure_deficit_hours;
        if deficit > BRANDING_DEFICIT_THRESHOLD_HOURS {
            score -= BRANDING_PENALTY;
            reasons.push(format!("广告曝光欠缺 {:.1}h (-{})", deficit, BRANDING_PENALTY));
        } else {
            reasons.push(format!("广告曝光欠缺 {:.1}h 可接受", deficit));
        }

        (score.clamp(0.0, 100.0), reasons)
    }

    /// 批量评分, 结果写回 ai_score
    #[instrument(skip(self, fleet), fields(count = fleet.len()))]
    pub fn score_fleet(&self, fleet: &mut [Trainset]) {
        for trainset in fleet.iter_mut() {
            let (score, _) = self.calculate_ai_score(trainset);
            trainset.ai_score = score;
        }
    }
}
