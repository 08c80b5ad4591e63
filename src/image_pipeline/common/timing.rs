use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct StageTiming {
    pub name: &'static str,
    pub duration: Duration,
}

/// Per-stage durations of a single capture cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleTimings {
    stages: Vec<StageTiming>,
}

impl CycleTimings {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn add_stage(&mut self, name: &'static str, duration: Duration) {
        self.stages.push(StageTiming { name, duration });
    }

    pub fn record(&mut self, timer: Timer) {
        let (name, duration) = timer.stop();
        self.add_stage(name, duration);
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    pub fn get_stage(&self, name: &str) -> Option<Duration> {
        self.stages
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.duration)
            .reduce(|a, b| a + b)
    }

    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn log_summary(&self) {
        let total = self.total_duration();
        for stage in &self.stages {
            let percentage = if total.as_secs_f64() > 0.0 {
                (stage.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            debug!(
                "{:<10} {:>9.3}ms ({:>5.1}%)",
                stage.name,
                stage.duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        debug!("{:<10} {:>9.3}ms", "total", total.as_secs_f64() * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}
