//! Least-squares regression tree used as the boosting stage learner.
//!
//! Splits are chosen on the gradient (residual) targets; leaves then hold a
//! Newton step `Σ g / Σ h` so each stage approximates one log-loss update.

use serde::{Deserialize, Serialize};

/// Gains below this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        value: f64,
    },
    /// Rows with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
}

struct Targets<'a> {
    rows: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fits one tree. `gradients[i]` and `hessians[i]` belong to `rows[i]`.
    pub fn fit(rows: &[Vec<f64>], gradients: &[f64], hessians: &[f64], params: TreeParams) -> Self {
        debug_assert_eq!(rows.len(), gradients.len());
        debug_assert_eq!(rows.len(), hessians.len());

        let targets = Targets {
            rows,
            gradients,
            hessians,
        };
        let indices: Vec<usize> = (0..rows.len()).collect();
        Self {
            root: grow(&targets, indices, 0, params),
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
                    node = if row[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Largest feature index any split reads, if the tree splits at all.
    pub fn max_feature(&self) -> Option<usize> {
        fn walk(node: &Node) -> Option<usize> {
            match node {
                Node::Leaf { .. } => None,
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => [Some(*feature), walk(left), walk(right)]
                    .into_iter()
                    .flatten()
                    .max(),
            }
        }
        walk(&self.root)
    }
}

fn grow(targets: &Targets<'_>, indices: Vec<usize>, depth: usize, params: TreeParams) -> Node {
    if depth >= params.max_depth || indices.len() < params.min_samples_split.max(2) {
        return leaf(targets, &indices);
    }
    let Some(split) = best_split(targets, &indices) else {
        return leaf(targets, &indices);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| targets.rows[i][split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(targets, left, depth + 1, params)),
        right: Box::new(grow(targets, right, depth + 1, params)),
    }
}

fn leaf(targets: &Targets<'_>, indices: &[usize]) -> Node {
    let gradient: f64 = indices.iter().map(|&i| targets.gradients[i]).sum();
    let hessian: f64 = indices.iter().map(|&i| targets.hessians[i]).sum();
    let value = if hessian.abs() < f64::EPSILON {
        0.0
    } else {
        gradient / hessian
    };
    Node::Leaf { value }
}

/// Split minimising the summed squared error of the gradients on both sides.
///
/// Minimising SSE is the same as maximising `S_l²/n_l + S_r²/n_r`, so only
/// running sums are needed per candidate threshold.
fn best_split(targets: &Targets<'_>, indices: &[usize]) -> Option<SplitCandidate> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| targets.gradients[i]).sum();
    let parent_score = total * total / n;
    let width = targets.rows.first().map_or(0, Vec::len);

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();
    for feature in 0..width {
        order.sort_by(|&a, &b| targets.rows[a][feature].total_cmp(&targets.rows[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..order.len() - 1 {
            left_sum += targets.gradients[order[pos]];
            let here = targets.rows[order[pos]][feature];
            let next = targets.rows[order[pos + 1]][feature];
            if here == next {
                continue;
            }

            let left_n = (pos + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total - left_sum;
            let gain =
                left_sum * left_sum / left_n + right_sum * right_sum / right_n - parent_score;

            if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}
