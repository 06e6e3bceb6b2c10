use std::sync::mpsc::Sender;

/// Observer of a coevolution run. All hooks are called from the controlling
/// thread, between evaluation passes.
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_subpopulation_evaluated(&mut self, generation: usize, subpop: usize, best_fitness: f64);
    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, evaluations: usize);
}

pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}
    fn on_subpopulation_evaluated(&mut self, _generation: usize, _subpop: usize, _best: f64) {}
    fn on_generation_complete(&mut self, _generation: usize, _best: f64, _evaluations: usize) {}
}

pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation);
    }

    fn on_subpopulation_evaluated(&mut self, generation: usize, subpop: usize, best_fitness: f64) {
        log::debug!(
            "  Generation {}: subpopulation {} evaluated, best fitness {:.4}",
            generation,
            subpop,
            best_fitness
        );
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, evaluations: usize) {
        log::info!(
            "Generation {} complete. Global best fitness: {:.4}, evaluations: {}",
            generation,
            best_fitness,
            evaluations
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    SubpopulationEvaluated { generation: usize, subpop: usize, best_fitness: f64 },
    GenerationComplete { generation: usize, best_fitness: f64, evaluations: usize },
}

/// Forwards progress to another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_subpopulation_evaluated(&mut self, generation: usize, subpop: usize, best_fitness: f64) {
        let _ = self.sender.send(ProgressMessage::SubpopulationEvaluated {
            generation,
            subpop,
            best_fitness,
        });
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, evaluations: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            best_fitness,
            evaluations,
        });
    }
}
