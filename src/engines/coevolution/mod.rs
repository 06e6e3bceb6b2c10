pub mod operators;
pub mod subpopulation;
pub mod collaboration;
pub mod progress;
pub mod report;
pub mod controller;

pub use collaboration::{aggregate_trials, CollaboratorSelector, ContextBuilder, Representatives};
pub use controller::{CoevolutionController, RunState};
pub use progress::{
    ChannelProgressCallback, LogProgressCallback, NoopProgressCallback, ProgressCallback,
    ProgressMessage,
};
pub use report::{RunFailure, RunPhase, RunReport, TerminalState};
pub use subpopulation::{evolve_population, initialize_population, GeneticOperators, Subpopulation};
