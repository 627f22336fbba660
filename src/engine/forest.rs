// ==========================================
// 地铁列车编组诱导系统 - 随机森林回归
// ==========================================
// 职责: 标准化器 + CART 回归树 + 自助采样随机森林
// 说明: 使用全部特征, 方差(SSE)最小化切分, 叶子取均值
// ==========================================

use crate::config::settings::ForestSettings;
use crate::engine::predictor::PredictionError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ==========================================
// StandardScaler - 零均值单位方差标准化
// ==========================================
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// 拟合均值与标准差（标准差为 0 的特征按 1.0 处理）
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, PredictionError> {
        let width = check_matrix(rows)?;
        let n = rows.len() as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v / n;
            }
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2) / n;
            }
        }
        for s in scales.iter_mut() {
            *s = s.sqrt();
            if *s < f64::EPSILON {
                *s = 1.0;
            }
        }

        Ok(Self { means, scales })
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.width() {
            return Err(PredictionError::FeatureWidthMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}

/// 校验矩阵非空、等宽、全部有限值, 返回列数
fn check_matrix(rows: &[Vec<f64>]) -> Result<usize, PredictionError> {
    let width = match rows.first() {
        Some(first) => first.len(),
        None => {
            return Err(PredictionError::InsufficientData {
                samples: 0,
                required: 1,
            })
        }
    };
    for row in rows {
        if row.len() != width {
            return Err(PredictionError::FeatureWidthMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(PredictionError::Model("训练矩阵包含非有限值".to_string()));
        }
    }
    Ok(width)
}

// ==========================================
// RegressionTree - CART 回归树
// ==========================================
#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

struct TreeParams {
    max_depth: usize,
    min_samples_split: usize,
}

impl RegressionTree {
    fn fit(x: &[Vec<f64>], y: &[f64], indices: Vec<usize>, params: &TreeParams) -> Self {
        Self {
            root: build_node(x, y, indices, 0, params),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: &TreeParams,
) -> Node {
    let value = mean_of(y, &indices);
    if depth >= params.max_depth || indices.len() < params.min_samples_split.max(2) {
        return Node::Leaf { value };
    }

    match best_split(x, y, &indices) {
        Some((feature, threshold)) => {
            let (left, right): (Vec<usize>, Vec<usize>) =
                indices.into_iter().partition(|&i| x[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                return Node::Leaf { value };
            }
            Node::Split {
                feature,
                threshold,
                left: Box::new(build_node(x, y, left, depth + 1, params)),
                right: Box::new(build_node(x, y, right, depth + 1, params)),
            }
        }
        None => Node::Leaf { value },
    }
}

/// 在所有特征上搜索 SSE 最小的切分点
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len();
    let width = x[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;
    if parent_sse <= 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64, f64)> = None;
    let mut order = indices.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for pos in 1..n {
            let prev = order[pos - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            let lo = x[prev][feature];
            let hi = x[order[pos]][feature];
            if hi <= lo {
                continue;
            }

            let n_left = pos as f64;
            let n_right = (n - pos) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left)
                + (right_sq - right_sum * right_sum / n_right);

            if best.map_or(true, |(_, _, b)| sse < b) {
                best = Some((feature, (lo + hi) / 2.0, sse));
            }
        }
    }

    match best {
        Some((feature, threshold, sse)) if sse < parent_sse - 1e-12 => Some((feature, threshold)),
        _ => None,
    }
}

// ==========================================
// RandomForestRegressor - 随机森林回归
// ==========================================
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    width: usize,
}

impl RandomForestRegressor {
    /// 训练森林（每棵树自助采样 n 个样本）
    pub fn fit(x: &[Vec<f64>], y: &[f64], settings: &ForestSettings) -> Result<Self, PredictionError> {
        let width = check_matrix(x)?;
        if x.len() != y.len() {
            return Err(PredictionError::Model(format!(
                "样本数 {} 与标签数 {} 不一致",
                x.len(),
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(PredictionError::Model("训练标签包含非有限值".to_string()));
        }

        let params = TreeParams {
            max_depth: settings.max_depth,
            min_samples_split: settings.min_samples_split,
        };
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let n = x.len();

        let trees = (0..settings.tree_count.max(1))
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, sample, &params)
            })
            .collect();

        Ok(Self { trees, width })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// 预测均值与树间标准差
    pub fn predict_with_spread(&self, row: &[f64]) -> Result<(f64, f64), PredictionError> {
        if row.len() != self.width {
            return Err(PredictionError::FeatureWidthMismatch {
                expected: self.width,
                actual: row.len(),
            });
        }
        let outputs: Vec<f64> = self.trees.iter().map(|t| t.predict(row)).collect();
        let n = outputs.len() as f64;
        let mean = outputs.iter().sum::<f64>() / n;
        let var = outputs.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Ok((mean, var.sqrt()))
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, PredictionError> {
        self.predict_with_spread(row).map(|(mean, _)| mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_zero_mean_unit_variance() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.transform(&[1.0, 5.0]).unwrap(), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 5.0]).unwrap(), vec![1.0, 0.0]);
        assert!(scaler.transform(&[1.0]).is_err());
    }

    #[test]
    fn test_forest_learns_step_function() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 5.0 } else { 25.0 }).collect();

        let forest = RandomForestRegressor::fit(&x, &y, &ForestSettings::default()).unwrap();
        assert_eq!(forest.tree_count(), 50);

        let low = forest.predict(&[3.0]).unwrap();
        let high = forest.predict(&[35.0]).unwrap();
        assert!(low < 10.0, "low={}", low);
        assert!(high > 20.0, "high={}", high);
    }

    #[test]
    fn test_forest_deterministic_for_seed() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| (i as f64).sqrt()).collect();
        let settings = ForestSettings::default();

        let a = RandomForestRegressor::fit(&x, &y, &settings).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &settings).unwrap();
        assert_eq!(a.predict(&[12.0, 5.0]).unwrap(), b.predict(&[12.0, 5.0]).unwrap());
    }

    #[test]
    fn test_forest_rejects_mismatched_labels() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![1.0];
        assert!(matches!(
            RandomForestRegressor::fit(&x, &y, &ForestSettings::default()),
            Err(PredictionError::Model(_))
        ));
    }
}
