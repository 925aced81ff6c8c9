//! The interface a host application implements to drive the simulation.

use crate::context::SimContext;
use crate::error::SimError;

/// Lifecycle hooks invoked by [`SimContext`].
///
/// The core calls these explicitly; there is no registration step. Every
/// hook defaults to doing nothing.
pub trait Host {
    /// After the state is mapped and the grids rebuilt.
    fn on_initialize(&mut self, ctx: &mut SimContext) -> Result<(), SimError> {
        let _ = ctx;
        Ok(())
    }

    /// At the start of every [`advance`](SimContext::advance), before
    /// entities move. The place to steer, spawn and despawn.
    fn on_tick(&mut self, ctx: &mut SimContext) -> Result<(), SimError> {
        let _ = ctx;
        Ok(())
    }

    /// Before the arena is unmapped.
    fn on_finalize(&mut self, ctx: &SimContext) -> Result<(), SimError> {
        let _ = ctx;
        Ok(())
    }
}

/// A host with no behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl Host for NullHost {}
