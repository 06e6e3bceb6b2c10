use ccfs::config::{
    CollaborationStrategy, CoevolutionConfig, ConfigManager, ConfigSection,
    DecompositionStrategy, ScoreMetric, WrapperConfig,
};
use ccfs::error::{CcfsError, ErrorKind};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_defaults_are_valid() {
    let manager = ConfigManager::new();
    let config = manager.get();
    assert!(config.validate().is_ok());
    assert_eq!(config.coevolution.num_subpopulations, 4);
    assert_eq!(config.coevolution.collaboration_strategy, CollaborationStrategy::Best);
    assert_eq!(config.wrapper.metric, ScoreMetric::Accuracy);
    assert!(config.data.path.is_none());
}

#[test]
fn test_invalid_coevolution_values_rejected() {
    let invalid = [
        CoevolutionConfig { num_subpopulations: 0, ..Default::default() },
        CoevolutionConfig { population_size: 1, ..Default::default() },
        CoevolutionConfig { max_generations: 0, ..Default::default() },
        CoevolutionConfig { crossover_rate: 1.5, ..Default::default() },
        CoevolutionConfig { mutation_rate: -0.1, ..Default::default() },
        CoevolutionConfig { alpha: 1.01, ..Default::default() },
        CoevolutionConfig { init_density: 0.0, ..Default::default() },
        CoevolutionConfig { tournament_size: 31, ..Default::default() },
        CoevolutionConfig { elitism: 30, ..Default::default() },
        CoevolutionConfig { epsilon: f64::NAN, ..Default::default() },
        CoevolutionConfig { collaborator_samples: 0, ..Default::default() },
        CoevolutionConfig { subpopulation_sizes: Some(vec![10, 10]), ..Default::default() },
        CoevolutionConfig { subpopulation_sizes: Some(vec![10, 10, 1, 10]), ..Default::default() },
        CoevolutionConfig {
            subpopulation_sizes: Some(vec![10, 10, 2, 10]),
            elitism: 2,
            ..Default::default()
        },
    ];
    for config in invalid {
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "{:?}", config);
    }
}

#[test]
fn test_subpopulation_sizes_override_population_size() {
    let config = CoevolutionConfig {
        num_subpopulations: 3,
        subpopulation_sizes: Some(vec![4, 6, 10]),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    assert_eq!(config.population_size_of(0), 4);
    assert_eq!(config.population_size_of(2), 10);

    let uniform = CoevolutionConfig::default();
    assert_eq!(uniform.population_size_of(3), uniform.population_size);
}

#[test]
fn test_wrapper_needs_two_folds() {
    let config = WrapperConfig {
        kfolds: 1,
        ..Default::default()
    };
    assert!(config.validate().is_err());
    assert_eq!(WrapperConfig::section_name(), "wrapper");
}

#[test]
fn test_load_toml_with_kebab_case_enums() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ccfs.toml");
    fs::write(
        &path,
        r#"
[coevolution]
num_subpopulations = 3
decomposition_strategy = "round-robin"
collaboration_strategy = "random-average"
alpha = 0.8
random_seed = 7
subpopulation_sizes = [4, 6, 8]

[wrapper]
kfolds = 3
metric = "macro-f1"

[data]
path = "data/train.csv"
label_column = "class"
"#,
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(&path).unwrap();
    let config = manager.get();

    assert_eq!(config.coevolution.num_subpopulations, 3);
    assert_eq!(config.coevolution.decomposition_strategy, DecompositionStrategy::RoundRobin);
    assert_eq!(
        config.coevolution.collaboration_strategy,
        CollaborationStrategy::RandomAverage
    );
    assert_eq!(config.coevolution.alpha, 0.8);
    assert_eq!(config.coevolution.random_seed, 7);
    assert_eq!(config.coevolution.subpopulation_sizes, Some(vec![4, 6, 8]));
    // Unspecified keys keep their defaults.
    assert_eq!(config.coevolution.population_size, 30);
    assert_eq!(config.wrapper.kfolds, 3);
    assert_eq!(config.wrapper.metric, ScoreMetric::MacroF1);
    assert_eq!(config.data.label_column.as_deref(), Some("class"));
}

#[test]
fn test_load_rejects_invalid_file_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[coevolution]\nalpha = 2.0\n").unwrap();

    let manager = ConfigManager::new();
    assert!(manager.load_from_file(&path).is_err());
    assert_eq!(manager.get().coevolution.alpha, 0.95);
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let manager = ConfigManager::new();
    let err = manager.load_from_file("does/not/exist.toml").unwrap_err();
    assert!(matches!(err, CcfsError::Configuration(_)));
}

#[test]
fn test_update_is_validated() {
    let manager = ConfigManager::new();
    manager
        .update(|c| c.coevolution.max_generations = 12)
        .unwrap();
    assert_eq!(manager.get().coevolution.max_generations, 12);

    let result = manager.update(|c| c.coevolution.elitism = 0);
    assert!(result.is_err());
    assert_eq!(manager.get().coevolution.elitism, 1);
}

#[test]
fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("saved.toml");

    let manager = ConfigManager::new();
    manager
        .update(|c| {
            c.coevolution.collaboration_strategy = CollaborationStrategy::Random;
            c.coevolution.cache_evaluations = true;
            c.wrapper.metric = ScoreMetric::MacroF1;
        })
        .unwrap();
    manager.save_to_file(&path).unwrap();

    let reloaded = ConfigManager::new();
    reloaded.load_from_file(&path).unwrap();
    let config = reloaded.get();
    assert_eq!(config.coevolution.collaboration_strategy, CollaborationStrategy::Random);
    assert!(config.coevolution.cache_evaluations);
    assert_eq!(config.wrapper.metric, ScoreMetric::MacroF1);
}
