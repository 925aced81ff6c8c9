//! Per-tick performance metrics for the simulation.
//!
//! [`TickMetrics`] captures timing and population data for a single
//! [`advance`](crate::SimContext::advance).

/// Timing and population metrics collected during a single tick.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickMetrics {
    /// Tick number after the advance completed.
    pub tick: u64,
    /// Wall-clock time for the whole tick, excluding the host hook.
    pub total_us: u64,
    /// Time spent integrating and re-indexing entities.
    pub reindex_us: u64,
    /// Time spent in both field passes, including the swaps.
    pub diffusion_us: u64,
    /// Live creatures after the tick.
    pub creatures: usize,
    /// Live particles after the tick.
    pub particles: usize,
    /// Particles that expired this tick.
    pub expired_particles: usize,
    /// Worker threads used by the field passes.
    pub workers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = TickMetrics::default();
        assert_eq!(m.tick, 0);
        assert_eq!(m.total_us, 0);
        assert_eq!(m.expired_particles, 0);
    }
}
