/// Area under the ROC curve of `scores` against binary `labels`.
///
/// Tied scores are grouped into one ROC step (trapezoid over the tie), which
/// matches the Mann-Whitney U formulation. Returns `None` when only one class
/// is present, or when inputs are empty or mismatched.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    if labels.is_empty() || labels.len() != scores.len() {
        return None;
    }

    let n_pos = labels.iter().filter(|&&l| l == 1).count() as f64;
    let n_neg = labels.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return None;
    }

    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(labels.iter())
        .map(|(&s, &l)| (s, l == 1))
        .collect();
    // Descending by score
    pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut auc = 0.0;
    let (mut tp, mut fp) = (0.0, 0.0);
    let (mut tpr_prev, mut fpr_prev) = (0.0, 0.0);

    let mut i = 0;
    while i < pairs.len() {
        let score = pairs[i].0;
        let mut j = i;
        while j < pairs.len() && pairs[j].0 == score {
            if pairs[j].1 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            j += 1;
        }

        let tpr = tp / n_pos;
        let fpr = fp / n_neg;
        auc += (fpr - fpr_prev) * (tpr + tpr_prev) / 2.0;
        tpr_prev = tpr;
        fpr_prev = fpr;
        i = j;
    }

    Some(auc.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_ranking() {
        let auc = roc_auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9]).unwrap();
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn test_all_tied_is_half() {
        let auc = roc_auc(&[0, 1, 0, 1], &[0.5; 4]).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_partial_ranking() {
        // one of the four (pos, neg) pairs is misordered
        let auc = roc_auc(&[0, 1, 0, 1], &[0.1, 0.3, 0.35, 0.8]).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_is_none() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.2, 0.5, 0.9]), None);
        assert_eq!(roc_auc(&[0, 0], &[0.2, 0.5]), None);
        assert_eq!(roc_auc(&[], &[]), None);
    }
}
