use crate::domain::criteria::{clamp_score, CriterionResult};

/// Weighted-average percentage of the criterion sub-scores, in [0, 100].
///
/// Tables whose weights do not sum to 1.0 still produce a percentage; an
/// empty slice or zero total weight yields 0.
pub fn aggregate(results: &[CriterionResult]) -> f64 {
    let total_weight: f64 = results.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = results.iter().map(|r| r.score * r.weight).sum();
    clamp_score(weighted / (total_weight * 100.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::{evaluate, Comparison, BUFFETT_CRITERIA, GRAHAM_CRITERIA};
    use crate::domain::metrics::StockMetrics;
    use crate::test_support::worked_example;

    fn result(score: f64, weight: f64) -> CriterionResult {
        CriterionResult {
            key: "k".to_string(),
            comparison: Comparison::Minimum,
            threshold: 1.0,
            value: 1.0,
            passed: true,
            score,
            weight,
        }
    }

    #[test]
    fn empty_results_score_zero() {
        assert_eq!(aggregate(&[]), 0.0);
    }

    #[test]
    fn weights_are_normalized() {
        // Weights summing to 2.0 still give a plain weighted average.
        let results = [result(100.0, 1.5), result(0.0, 0.5)];
        assert!((aggregate(&results) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn worked_example_scores_above_seventy() {
        let results = evaluate(&worked_example(), &GRAHAM_CRITERIA);
        let score = aggregate(&results);
        assert!(score > 70.0, "score = {score}");
        assert!(score < 80.0, "score = {score}");
    }

    #[test]
    fn aggregate_stays_in_range_for_extreme_metrics() {
        let extremes = [-1e9, -1.0, 0.0, 0.5, 40.0, 1e9, f64::NAN, f64::NEG_INFINITY];
        for v in extremes {
            let m = StockMetrics {
                pe_ratio: v,
                pb_ratio: -v,
                current_ratio: v,
                debt_to_equity: -v,
                roe: v,
                earnings_growth: v,
                revenue_growth: -v,
                ..worked_example()
            };
            for table in [&GRAHAM_CRITERIA[..], &BUFFETT_CRITERIA[..]] {
                let score = aggregate(&evaluate(&m, table));
                assert!((0.0..=100.0).contains(&score), "{v} -> {score}");
            }
        }
    }
}
