use crate::config::DecompositionStrategy;
use crate::data::Dataset;
use crate::error::{CcfsError, Result};
use crate::types::Subcomponent;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Partition `[0, total_features)` into `num_subpopulations` disjoint subcomponents.
///
/// `Random` and `RoundRobin` produce sizes that differ by at most one, with the
/// remainder going to the first subcomponents. `Similarity` groups correlated
/// features together and may produce uneven sizes; it needs `dataset`.
pub fn decompose(
    total_features: usize,
    num_subpopulations: usize,
    strategy: DecompositionStrategy,
    seed: u64,
    dataset: Option<&dyn Dataset>,
) -> Result<Vec<Subcomponent>> {
    if num_subpopulations < 1 {
        return Err(CcfsError::Configuration(
            "Number of subpopulations must be at least 1".to_string(),
        ));
    }
    if num_subpopulations > total_features {
        return Err(CcfsError::Configuration(format!(
            "Cannot split {} features into {} subpopulations",
            total_features, num_subpopulations
        )));
    }

    let parts = match strategy {
        DecompositionStrategy::Random => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut order: Vec<usize> = (0..total_features).collect();
            order.shuffle(&mut rng);
            contiguous_split(&order, num_subpopulations)
        }
        DecompositionStrategy::RoundRobin => round_robin(total_features, num_subpopulations),
        DecompositionStrategy::Similarity => {
            let dataset = dataset.ok_or_else(|| {
                CcfsError::Configuration(
                    "Similarity decomposition requires a dataset".to_string(),
                )
            })?;
            if dataset.n_features() != total_features {
                return Err(CcfsError::Configuration(format!(
                    "Dataset has {} features, decomposition asked for {}",
                    dataset.n_features(),
                    total_features
                )));
            }
            correlation_clusters(dataset, num_subpopulations)
        }
    };

    log::debug!(
        "Decomposed {} features into subcomponents of sizes {:?}",
        total_features,
        parts.iter().map(|p| p.len()).collect::<Vec<_>>()
    );
    Ok(parts)
}

fn contiguous_split(order: &[usize], n: usize) -> Vec<Subcomponent> {
    let base = order.len() / n;
    let remainder = order.len() % n;
    let mut parts = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let size = base + usize::from(i < remainder);
        parts.push(Subcomponent::new(order[start..start + size].to_vec()));
        start += size;
    }
    parts
}

fn round_robin(total: usize, n: usize) -> Vec<Subcomponent> {
    let mut buckets = vec![Vec::new(); n];
    for feature in 0..total {
        buckets[feature % n].push(feature);
    }
    buckets.into_iter().map(Subcomponent::new).collect()
}

/// Greedy correlation clustering: choose `n` seed features farthest-first
/// (least absolute correlation with the seeds chosen so far), then attach each
/// remaining feature to the seed it is most correlated with.
fn correlation_clusters(dataset: &dyn Dataset, n: usize) -> Vec<Subcomponent> {
    let total = dataset.n_features();
    let columns: Vec<Vec<f64>> = (0..total).map(|f| dataset.column(f)).collect();

    // First seed: the feature most correlated with the label.
    let labels = dataset.labels();
    let first = (0..total)
        .max_by(|&a, &b| {
            pearson(&columns[a], labels)
                .abs()
                .total_cmp(&pearson(&columns[b], labels).abs())
                .then(b.cmp(&a))
        })
        .unwrap_or(0);

    let mut seeds = vec![first];
    // Highest |corr| between each feature and any chosen seed.
    let mut closeness: Vec<f64> = columns
        .iter()
        .map(|c| pearson(c, &columns[first]).abs())
        .collect();
    closeness[first] = f64::INFINITY;

    while seeds.len() < n {
        let next = (0..total)
            .filter(|f| !seeds.contains(f))
            .min_by(|&a, &b| closeness[a].total_cmp(&closeness[b]).then(a.cmp(&b)))
            .unwrap_or(0);
        seeds.push(next);
        for f in 0..total {
            let c = pearson(&columns[f], &columns[next]).abs();
            if c > closeness[f] {
                closeness[f] = c;
            }
        }
        closeness[next] = f64::INFINITY;
    }

    let mut clusters: Vec<Vec<usize>> = seeds.iter().map(|&s| vec![s]).collect();
    for f in 0..total {
        if seeds.contains(&f) {
            continue;
        }
        let mut best = 0;
        let mut best_corr = f64::NEG_INFINITY;
        for (k, &s) in seeds.iter().enumerate() {
            let c = pearson(&columns[f], &columns[s]).abs();
            if c > best_corr {
                best = k;
                best_corr = c;
            }
        }
        clusters[best].push(f);
    }

    clusters
        .into_iter()
        .map(|mut c| {
            c.sort_unstable();
            Subcomponent::new(c)
        })
        .collect()
}

/// Pearson correlation; constant inputs correlate 0 with everything.
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
