//! Pairwise Pearson correlation between developer activity and an external metric.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::models::{CorrelationResult, EntityId, Period, SeriesPoint, Strength};

/// A named comparison of one activity metric against one external metric,
/// e.g. `commits_price` = `commits` vs `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPair {
    pub name: &'static str,
    pub activity: &'static str,
    pub metric: &'static str,
}

impl MetricPair {
    pub const fn new(name: &'static str, activity: &'static str, metric: &'static str) -> Self {
        Self {
            name,
            activity,
            metric,
        }
    }
}

/// Pearson product-moment correlation over the first `min(len(a), len(b))` values.
///
/// Returns `0.0` when fewer than two pairs are available, when either side is
/// constant or contains non-finite values.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }
    let (a, b) = (&a[..n], &b[..n]);
    if !a.iter().chain(b).all(|v| v.is_finite()) || is_constant(a) || is_constant(b) {
        return 0.0;
    }

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Two-sided significance of `r` over `n` pairs, as `1 - p`.
///
/// Uses `t = |r|·sqrt((n-2)/(1-r²))` against a Student-t with `n-2` degrees
/// of freedom. `n < 3` gives `0.0`; `|r| = 1` gives `1.0`.
pub fn confidence(r: f64, n: usize) -> f64 {
    if n < 3 || !r.is_finite() {
        return 0.0;
    }
    let r = r.abs().min(1.0);
    if r >= 1.0 {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.cdf(t) - 1.0).clamp(0.0, 1.0),
        Err(_) => 0.0,
    }
}

/// Inner-joins two series on date, keeping the order of `a`.
pub fn align<'a, A, B>(a: &'a [A], b: &'a [B]) -> Vec<(&'a A, &'a B)>
where
    A: SeriesPoint,
    B: SeriesPoint,
{
    let by_date: HashMap<NaiveDate, &B> = b.iter().map(|p| (p.date(), p)).collect();
    a.iter()
        .filter_map(|pa| by_date.get(&pa.date()).map(|pb| (pa, *pb)))
        .collect()
}

/// Stateless; groups the analysis entry points.
pub struct CorrelationEngine;

impl CorrelationEngine {
    pub fn correlate(a: &[f64], b: &[f64]) -> f64 {
        pearson(a, b)
    }

    /// Aligns `activity` and `metric` by date and correlates every pair.
    pub fn analyze<A, B>(
        entity: &EntityId,
        period: Period,
        activity: &[A],
        metric: &[B],
        pairs: &[MetricPair],
    ) -> CorrelationResult
    where
        A: SeriesPoint,
        B: SeriesPoint,
    {
        let aligned = align(activity, metric);

        let mut correlations = IndexMap::with_capacity(pairs.len());
        for pair in pairs {
            let (xs, ys): (Vec<f64>, Vec<f64>) = aligned
                .iter()
                .filter_map(|(pa, pb)| Some((pa.metric(pair.activity)?, pb.metric(pair.metric)?)))
                .unzip();
            correlations.insert(pair.name.to_string(), pearson(&xs, &ys));
        }

        let mut result = CorrelationResult {
            entity_id: entity.clone(),
            period,
            correlations,
            confidence: 0.0,
            data_points: aligned.len(),
            interpretation: String::new(),
        };
        let strongest = result.strongest();
        result.confidence = confidence(strongest, result.data_points);
        result.interpretation = Strength::from_coefficient(strongest).sentence().to_string();
        result
    }
}
