//! Grouped statistics over in-memory rows.
//!
//! Everything here is a pure function of its input. Grouping helpers keep
//! groups in order of first appearance, and every sort is stable, so ties
//! always resolve to input order.

use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("cannot compute {what} over zero values")]
    EmptyInput { what: &'static str },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, AggregateError>;

/// Group rows by key, preserving first-appearance order of the keys.
pub fn group_by<'a, R, K, F>(rows: &'a [R], key_fn: F) -> Vec<(K, Vec<&'a R>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&R) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a R>)> = Vec::new();

    for row in rows {
        let key = key_fn(row);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    groups
}

/// Arithmetic mean. Fails on empty input.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(AggregateError::EmptyInput { what: "mean" });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Group rows, average `value_fn` per group, rank descending and keep the first `n`.
///
/// Ties keep the order in which their keys first appeared in `rows`.
pub fn top_by_metric<R, K, KF, VF>(rows: &[R], key_fn: KF, value_fn: VF, n: usize) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    KF: Fn(&R) -> K,
    VF: Fn(&R) -> f64,
{
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(K, f64)> = group_by(rows, key_fn)
        .into_iter()
        .filter_map(|(key, members)| {
            let values: Vec<f64> = members.iter().map(|&r| value_fn(r)).collect();
            // Groups are never empty, so mean cannot fail here
            mean(&values).ok().map(|m| (key, m))
        })
        .collect();

    // sort_by is stable; NaN compares equal so it cannot reorder neighbours
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// Rank individual rows by `value_fn` descending and keep the first `n`.
///
/// Each entry carries the row's index in `rows`. Ties keep input order.
pub fn top_rows<R, VF>(rows: &[R], value_fn: VF, n: usize) -> Vec<(usize, &R)>
where
    VF: Fn(&R) -> f64,
{
    let mut ranked: Vec<(usize, &R, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r, value_fn(r)))
        .collect();
    ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().take(n).map(|(i, r, _)| (i, r)).collect()
}

/// Frequency table: count per key, most frequent first, ties by first appearance.
pub fn count_by<R, K, F>(rows: &[R], key_fn: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: Fn(&R) -> K,
{
    let mut counts: Vec<(K, usize)> = group_by(rows, key_fn)
        .into_iter()
        .map(|(key, members)| (key, members.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Linear-interpolation quantile (R-7, the d3/numpy default).
///
/// Values are sorted ascending first; non-finite values are ignored and
/// `p` is clamped to `[0, 1]`.
pub fn quantile(values: &[f64], p: f64) -> Result<f64> {
    if p.is_nan() {
        return Err(AggregateError::InvalidParameter("quantile p is NaN".into()));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(AggregateError::EmptyInput { what: "quantile" });
    }
    sorted.sort_by(f64::total_cmp);

    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64))
}

/// Median via [`quantile`] at 0.5.
pub fn median(values: &[f64]) -> Result<f64> {
    quantile(values, 0.5).map_err(|e| match e {
        AggregateError::EmptyInput { .. } => AggregateError::EmptyInput { what: "median" },
        other => other,
    })
}
