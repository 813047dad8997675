//! Per-decision metrics for the episode loop.
//!
//! [`StepMetrics`] captures timing and bookkeeping for one
//! [`LockstepEnv::step`](crate::LockstepEnv::step) call.

/// Timing and bookkeeping collected during a single decision step.
///
/// Durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the whole decision, in microseconds.
    pub total_us: u64,
    /// Time spent moving the agent and resolving contacts.
    pub agent_us: u64,
    /// Time spent updating fish.
    pub fish_us: u64,
    /// Time spent writing the observation.
    pub observation_us: u64,
    /// Substeps actually run; fewer than the decision period when the
    /// episode ended part-way.
    pub substeps: u32,
    /// Rays cast while writing the observation.
    pub rays_cast: usize,
    /// Fish left in the area after the step.
    pub fish_remaining: usize,
    /// Agent steps taken so far this episode.
    pub episode_steps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.agent_us, 0);
        assert_eq!(m.fish_us, 0);
        assert_eq!(m.observation_us, 0);
        assert_eq!(m.substeps, 0);
        assert_eq!(m.rays_cast, 0);
        assert_eq!(m.fish_remaining, 0);
        assert_eq!(m.episode_steps, 0);
    }
}
