pub mod fitness;
pub mod model;

pub use fitness::{perturb_seed, FitnessEvaluator};
pub use model::ModelAdapter;
