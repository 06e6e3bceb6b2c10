use ccfs::config::ConfigManager;
use ccfs::data::CsvConnector;
use ccfs::engines::CoevolutionController;
use ccfs::ml::NearestCentroidModel;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let manager = ConfigManager::new();
    match args.next() {
        Some(path) => manager.load_from_file(&path)?,
        None => manager.load_from_env()?,
    }
    let config = manager.get();

    let data_path = config
        .data
        .path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no dataset configured (set data.path or CCFS__DATA__PATH)"))?;
    let dataset = CsvConnector::load(&data_path, config.data.label_column.as_deref())?;
    let model = NearestCentroidModel::from_config(&config.wrapper);

    let mut controller = CoevolutionController::new(config.coevolution, dataset, model);
    let report = controller.run();

    println!("{}", report.to_json()?);
    if let Some(failure) = &report.failure {
        anyhow::bail!(
            "run failed during {:?} ({:?}): {}",
            failure.phase,
            failure.kind,
            failure.message
        );
    }
    Ok(())
}
