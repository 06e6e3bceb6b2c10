use ccfs::config::DecompositionStrategy;
use ccfs::data::{Dataset, InMemoryDataset};
use ccfs::engines::decompose;
use ccfs::error::{CcfsError, ErrorKind};
use ccfs::types::Subcomponent;

fn assert_partition(parts: &[Subcomponent], total: usize) {
    let mut seen = vec![0usize; total];
    for part in parts {
        for &f in &part.indices {
            assert!(f < total, "feature {} out of range", f);
            seen[f] += 1;
        }
    }
    assert!(seen.iter().all(|&c| c == 1), "not a partition: {:?}", seen);
}

fn assert_balanced(parts: &[Subcomponent]) {
    let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
    let max = *sizes.iter().max().unwrap();
    let min = *sizes.iter().min().unwrap();
    assert!(max - min <= 1, "unbalanced sizes {:?}", sizes);
    // Remainder goes to the first subcomponents.
    assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "sizes {:?}", sizes);
}

#[test]
fn test_round_robin_ten_features_two_subpopulations() {
    let parts = decompose(10, 2, DecompositionStrategy::RoundRobin, 0, None).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].indices, vec![0, 2, 4, 6, 8]);
    assert_eq!(parts[1].indices, vec![1, 3, 5, 7, 9]);
}

#[test]
fn test_balanced_strategies_partition_exactly() {
    for &strategy in &[DecompositionStrategy::Random, DecompositionStrategy::RoundRobin] {
        for &(total, n) in &[(1, 1), (7, 3), (10, 10), (100, 7), (33, 4)] {
            let parts = decompose(total, n, strategy, 17, None).unwrap();
            assert_eq!(parts.len(), n);
            assert_partition(&parts, total);
            assert_balanced(&parts);
        }
    }
}

#[test]
fn test_random_decomposition_is_seeded() {
    let a = decompose(50, 4, DecompositionStrategy::Random, 3, None).unwrap();
    let b = decompose(50, 4, DecompositionStrategy::Random, 3, None).unwrap();
    let c = decompose(50, 4, DecompositionStrategy::Random, 4, None).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_invalid_subpopulation_counts() {
    let zero = decompose(10, 0, DecompositionStrategy::Random, 0, None).unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::Configuration);

    let too_many = decompose(3, 4, DecompositionStrategy::RoundRobin, 0, None).unwrap_err();
    assert!(matches!(too_many, CcfsError::Configuration(_)));
}

#[test]
fn test_similarity_requires_dataset() {
    let err = decompose(6, 2, DecompositionStrategy::Similarity, 0, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

/// Features 0..3 follow one signal, features 3..6 another.
fn two_signal_dataset() -> InMemoryDataset {
    let a = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0, 8.0, 7.0];
    let b = [4.0, 1.0, 7.0, 2.0, 8.0, 3.0, 1.0, 6.0];
    let rows: Vec<Vec<f64>> = (0..a.len())
        .map(|i| {
            vec![
                a[i],
                2.0 * a[i] + 1.0,
                -a[i] + 0.01 * i as f64,
                b[i],
                0.5 * b[i] - 3.0,
                b[i] + 0.02 * i as f64,
            ]
        })
        .collect();
    let labels = a.iter().map(|&v| if v > 4.0 { 1.0 } else { 0.0 }).collect();
    InMemoryDataset::from_rows(&rows, labels).unwrap()
}

#[test]
fn test_similarity_groups_correlated_features() {
    let dataset = two_signal_dataset();
    let parts = decompose(
        dataset.n_features(),
        2,
        DecompositionStrategy::Similarity,
        0,
        Some(&dataset as &dyn Dataset),
    )
    .unwrap();

    assert_partition(&parts, 6);
    let mut groups: Vec<Vec<usize>> = parts.into_iter().map(|p| p.indices).collect();
    groups.sort();
    assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4, 5]]);
}

#[test]
fn test_similarity_partitions_with_many_groups() {
    let dataset = two_signal_dataset();
    for n in 1..=6 {
        let parts = decompose(6, n, DecompositionStrategy::Similarity, 0, Some(&dataset as &dyn Dataset))
            .unwrap();
        assert_eq!(parts.len(), n);
        assert_partition(&parts, 6);
        assert!(parts.iter().all(|p| !p.is_empty()));
    }
}
