pub mod decomposition;
pub mod evaluation;
pub mod coevolution;

pub use coevolution::{CoevolutionController, RunReport, TerminalState};
pub use decomposition::decompose;
pub use evaluation::{FitnessEvaluator, ModelAdapter};
