use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Class id of a numeric label.
pub fn class_of(label: f64) -> i64 {
    label.round() as i64
}

/// Classification quality of a set of predictions. Precision, recall and F1
/// are macro-averaged over the classes present in either vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl ClassificationMetrics {
    pub fn compute(y_true: &[i64], y_pred: &[i64]) -> Self {
        let n = y_true.len().min(y_pred.len());
        if n == 0 {
            return Self {
                accuracy: 0.0,
                precision: 0.0,
                recall: 0.0,
                f1_score: 0.0,
            };
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let classes: BTreeSet<i64> = y_true[..n].iter().chain(&y_pred[..n]).copied().collect();

        // (true positives, false positives, false negatives) per class
        let mut counts: BTreeMap<i64, (usize, usize, usize)> =
            classes.iter().map(|&c| (c, (0, 0, 0))).collect();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t == p {
                if let Some(c) = counts.get_mut(&t) {
                    c.0 += 1;
                }
            } else {
                if let Some(c) = counts.get_mut(&p) {
                    c.1 += 1;
                }
                if let Some(c) = counts.get_mut(&t) {
                    c.2 += 1;
                }
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let mut precision = 0.0;
        let mut recall = 0.0;
        let mut f1 = 0.0;
        for &(tp, fp, fn_) in counts.values() {
            let p = ratio(tp, tp + fp);
            let r = ratio(tp, tp + fn_);
            precision += p;
            recall += r;
            f1 += if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
        }
        let k = counts.len() as f64;

        Self {
            accuracy: correct as f64 / n as f64,
            precision: precision / k,
            recall: recall / k,
            f1_score: f1 / k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let m = ClassificationMetrics::compute(&[0, 1, 1, 2], &[0, 1, 1, 2]);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.f1_score, 1.0);
    }

    #[test]
    fn test_macro_f1() {
        // class 0: tp=1 fp=1 fn=0 -> p=0.5 r=1 f1=2/3
        // class 1: tp=1 fp=0 fn=1 -> p=1 r=0.5 f1=2/3
        let m = ClassificationMetrics::compute(&[0, 1, 1], &[0, 0, 1]);
        assert!((m.accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_score - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.precision - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_class_of_rounds() {
        assert_eq!(class_of(1.0), 1);
        assert_eq!(class_of(2.4999), 2);
    }
}
