//! The explicit simulation context.
//!
//! [`SimContext`] owns the mapped [`State`], the shell tables for both
//! grids and the configuration. Every operation goes through it; there is
//! no global state.

use std::time::Instant;

use glam::{Vec2, Vec3};
use vivarium_arena::{ArenaOrigin, Persistent, PoolError, StateArena};
use vivarium_core::ObjectId;
use vivarium_space::{EdgeBehavior, Hashspace, Planar, ShellTable, Volumetric};

use crate::config::SimConfig;
use crate::diffusion::{cell_of, diffuse};
use crate::error::SimError;
use crate::host::Host;
use crate::layout::{
    CREATURE_GRID_RESOLUTION, MAX_CREATURES, MAX_PARTICLES, PARTICLE_GRID_RESOLUTION,
};
use crate::metrics::TickMetrics;
use crate::species::Species;
use crate::state::{Creature, CreatureStore, Particle, ParticleStore, State};

/// Read-only view of the creature grid.
pub type CreatureGrid<'a> = Hashspace<'a, Planar, &'a CreatureStore>;

/// Read-only view of the particle grid.
pub type ParticleGrid<'a> = Hashspace<'a, Volumetric, &'a ParticleStore>;

/// Owner of all simulation state for one run.
pub struct SimContext {
    config: SimConfig,
    workers: usize,
    arena: StateArena<State>,
    creature_shells: ShellTable,
    particle_shells: ShellTable,
    sediment: Vec<[f32; 2]>,
    last_metrics: TickMetrics,
}

impl SimContext {
    /// Map (or create) the state file and rebuild both grids from the
    /// persisted positions of live entities.
    pub fn initialize(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let creature_shells = ShellTable::new(2, CREATURE_GRID_RESOLUTION, config.creature_edge)?;
        let particle_shells = ShellTable::new(3, PARTICLE_GRID_RESOLUTION, config.particle_edge)?;

        let mut arena = StateArena::<State>::create(&config.arena)?;
        if arena.is_blank() {
            arena.initialize();
        }
        arena.verify()?;

        let workers = config.resolved_worker_count();
        let mut ctx = Self {
            config,
            workers,
            arena,
            creature_shells,
            particle_shells,
            sediment: Vec::with_capacity(MAX_PARTICLES),
            last_metrics: TickMetrics::default(),
        };
        ctx.rebuild_grids()?;

        tracing::info!(
            path = %ctx.arena.path().display(),
            origin = ?ctx.arena.origin(),
            tick = ctx.tick(),
            creatures = ctx.creature_count(),
            particles = ctx.particle_count(),
            workers,
            "simulation initialized"
        );
        Ok(ctx)
    }

    /// [`initialize`](Self::initialize), then run the host's
    /// [`on_initialize`](Host::on_initialize) hook.
    pub fn initialize_with<H: Host + ?Sized>(
        config: SimConfig,
        host: &mut H,
    ) -> Result<Self, SimError> {
        let mut ctx = Self::initialize(config)?;
        host.on_initialize(&mut ctx)?;
        Ok(ctx)
    }

    fn rebuild_grids(&mut self) -> Result<(), SimError> {
        let (min, max) = (self.config.world_min, self.config.world_max);
        let state: &mut State = &mut self.arena;
        state.params.world_min = min;
        state.params.world_max = max;

        let mut creatures =
            Hashspace::<Planar, _>::attach(&self.creature_shells, &mut state.creature_grid)?;
        creatures.reset(Vec2::new(min[0], min[1]), Vec2::new(max[0], max[1]))?;
        for id in state.creature_pool.iter_live() {
            let c = &mut state.creatures[id.index()];
            confine(&mut c.position, &mut c.velocity, &min, &max, self.config.creature_edge);
            creatures.insert_or_update(id, Vec2::from_array(c.position))?;
        }

        let mut particles =
            Hashspace::<Volumetric, _>::attach(&self.particle_shells, &mut state.particle_grid)?;
        particles.reset(Vec3::from_array(min), Vec3::from_array(max))?;
        for id in state.particle_pool.iter_live() {
            let p = &mut state.particles[id.index()];
            confine(&mut p.position, &mut p.velocity, &min, &max, self.config.particle_edge);
            particles.insert_or_update(id, Vec3::from_array(p.position))?;
        }
        Ok(())
    }

    /// The active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The persisted aggregate.
    pub fn state(&self) -> &State {
        &self.arena
    }

    /// How the state file looked when it was mapped.
    pub fn origin(&self) -> ArenaOrigin {
        self.arena.origin()
    }

    /// Completed ticks, persisted across restarts.
    pub fn tick(&self) -> u64 {
        self.arena.params.tick()
    }

    /// Metrics from the most recent [`advance`](Self::advance).
    pub fn last_metrics(&self) -> &TickMetrics {
        &self.last_metrics
    }

    /// Live creatures.
    pub fn creature_count(&self) -> usize {
        self.arena.creature_pool.live_count()
    }

    /// Live particles.
    pub fn particle_count(&self) -> usize {
        self.arena.particle_pool.live_count()
    }

    /// Read-only creature grid.
    pub fn creature_grid(&self) -> Result<CreatureGrid<'_>, SimError> {
        Ok(Hashspace::attach(
            &self.creature_shells,
            &self.arena.creature_grid,
        )?)
    }

    /// Read-only particle grid.
    pub fn particle_grid(&self) -> Result<ParticleGrid<'_>, SimError> {
        Ok(Hashspace::attach(
            &self.particle_shells,
            &self.arena.particle_grid,
        )?)
    }

    // ── creatures ──────────────────────────────────────────────────

    /// Allocate a creature slot and index it at `position`.
    ///
    /// Returns `Ok(None)` when every slot is live.
    pub fn spawn_creature(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        species: Species,
    ) -> Result<Option<ObjectId>, SimError> {
        check_velocity(&velocity.to_array())?;
        let (min, max, edge) = (
            self.config.world_min,
            self.config.world_max,
            self.config.creature_edge,
        );
        let state: &mut State = &mut self.arena;
        let mut grid =
            Hashspace::<Planar, _>::attach(&self.creature_shells, &mut state.creature_grid)?;
        let id = match state.creature_pool.allocate() {
            Ok(id) => id,
            Err(PoolError::Exhausted { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut record = Creature {
            position: position.to_array(),
            velocity: velocity.to_array(),
            species: species.encode(),
        };
        confine(&mut record.position, &mut record.velocity, &min, &max, edge);
        if let Err(err) = grid.insert_or_update(id, Vec2::from_array(record.position)) {
            state.creature_pool.release(id)?;
            return Err(err.into());
        }
        state.creatures[id.index()] = record;
        Ok(Some(id))
    }

    /// Release a creature slot and drop it from the grid.
    pub fn despawn_creature(&mut self, id: ObjectId) -> Result<(), SimError> {
        let state: &mut State = &mut self.arena;
        state.creature_pool.release(id)?;
        Hashspace::<Planar, _>::attach(&self.creature_shells, &mut state.creature_grid)?
            .remove(id)?;
        state.creatures[id.index()] = Creature::default();
        Ok(())
    }

    fn live_creature(&self, id: ObjectId) -> Result<&Creature, SimError> {
        if !self.arena.creature_pool.is_live(id) {
            return Err(SimError::NotLive { id });
        }
        Ok(&self.arena.creatures[id.index()])
    }

    /// A copy of a live creature's record.
    pub fn creature(&self, id: ObjectId) -> Result<Creature, SimError> {
        self.live_creature(id).copied()
    }

    /// Decoded species of a live creature.
    pub fn species_of(&self, id: ObjectId) -> Result<Species, SimError> {
        self.live_creature(id)?.species.decode()
    }

    /// Teleport a live creature and re-index it.
    pub fn move_creature(&mut self, id: ObjectId, position: Vec2) -> Result<(), SimError> {
        self.live_creature(id)?;
        let (min, max, edge) = (
            self.config.world_min,
            self.config.world_max,
            self.config.creature_edge,
        );
        let state: &mut State = &mut self.arena;
        let c = &mut state.creatures[id.index()];
        let mut next = position.to_array();
        confine(&mut next, &mut c.velocity, &min, &max, edge);
        Hashspace::<Planar, _>::attach(&self.creature_shells, &mut state.creature_grid)?
            .insert_or_update(id, Vec2::from_array(next))?;
        c.position = next;
        Ok(())
    }

    /// Set a live creature's velocity.
    pub fn set_velocity(&mut self, id: ObjectId, velocity: Vec2) -> Result<(), SimError> {
        self.live_creature(id)?;
        check_velocity(&velocity.to_array())?;
        self.arena.creatures[id.index()].velocity = velocity.to_array();
        Ok(())
    }

    /// Replace a live creature's species data.
    pub fn set_species(&mut self, id: ObjectId, species: Species) -> Result<(), SimError> {
        self.live_creature(id)?;
        self.arena.creatures[id.index()].species = species.encode();
        Ok(())
    }

    /// Creatures within `radius` of `position`.
    pub fn neighbors(&self, position: Vec2, radius: f32) -> Result<Vec<ObjectId>, SimError> {
        let mut out = Vec::new();
        self.neighbors_into(position, radius, &mut out)?;
        Ok(out)
    }

    /// Append creatures within `radius` of `position` to `out`; returns how
    /// many were appended.
    pub fn neighbors_into(
        &self,
        position: Vec2,
        radius: f32,
        out: &mut Vec<ObjectId>,
    ) -> Result<usize, SimError> {
        let before = out.len();
        out.extend(self.creature_grid()?.query_radius(position, radius)?);
        Ok(out.len() - before)
    }

    /// Other creatures within the configured neighbor radius of `id`.
    pub fn neighbors_of(&self, id: ObjectId) -> Result<Vec<ObjectId>, SimError> {
        let centre = Vec2::from_array(self.live_creature(id)?.position);
        let mut out = self.neighbors(centre, self.config.neighbor_radius)?;
        out.retain(|&other| other != id);
        Ok(out)
    }

    // ── particles ──────────────────────────────────────────────────

    /// Allocate a particle that lives for `ttl` ticks.
    ///
    /// Returns `Ok(None)` when every slot is live.
    pub fn spawn_particle(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        ttl: u32,
    ) -> Result<Option<ObjectId>, SimError> {
        check_velocity(&velocity.to_array())?;
        let (min, max, edge) = (
            self.config.world_min,
            self.config.world_max,
            self.config.particle_edge,
        );
        let state: &mut State = &mut self.arena;
        let mut grid =
            Hashspace::<Volumetric, _>::attach(&self.particle_shells, &mut state.particle_grid)?;
        let id = match state.particle_pool.allocate() {
            Ok(id) => id,
            Err(PoolError::Exhausted { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut record = Particle {
            position: position.to_array(),
            velocity: velocity.to_array(),
            ttl,
        };
        confine(&mut record.position, &mut record.velocity, &min, &max, edge);
        if let Err(err) = grid.insert_or_update(id, Vec3::from_array(record.position)) {
            state.particle_pool.release(id)?;
            return Err(err.into());
        }
        state.particles[id.index()] = record;
        Ok(Some(id))
    }

    /// Release a particle slot and drop it from the grid.
    pub fn despawn_particle(&mut self, id: ObjectId) -> Result<(), SimError> {
        let state: &mut State = &mut self.arena;
        state.particle_pool.release(id)?;
        Hashspace::<Volumetric, _>::attach(&self.particle_shells, &mut state.particle_grid)?
            .remove(id)?;
        state.particles[id.index()] = Particle::default();
        Ok(())
    }

    /// A copy of a live particle's record.
    pub fn particle(&self, id: ObjectId) -> Result<Particle, SimError> {
        if !self.arena.particle_pool.is_live(id) {
            return Err(SimError::NotLive { id });
        }
        Ok(self.arena.particles[id.index()])
    }

    /// Append particles within `radius` of `position` to `out`; returns how
    /// many were appended.
    pub fn particles_within(
        &self,
        position: Vec3,
        radius: f32,
        out: &mut Vec<ObjectId>,
    ) -> Result<usize, SimError> {
        let before = out.len();
        out.extend(self.particle_grid()?.query_radius(position, radius)?);
        Ok(out.len() - before)
    }

    // ── tick ───────────────────────────────────────────────────────

    /// Run one tick.
    ///
    /// Order: host hook, creature integration and re-index, particle
    /// integration and expiry, pheromone pass, height pass. Each field pass
    /// reads only the committed side and commits once all workers joined.
    ///
    /// Fails with [`SimError::UnstableMotion`] (or
    /// [`SimError::UnknownSpecies`]) before anything moves if some entity's
    /// next position would not be finite or its species record is invalid.
    pub fn advance<H: Host + ?Sized>(&mut self, host: &mut H) -> Result<TickMetrics, SimError> {
        host.on_tick(self)?;

        let start = Instant::now();
        let dt = self.config.dt;
        let (min, max) = (self.config.world_min, self.config.world_max);
        let creature_edge = self.config.creature_edge;
        let particle_edge = self.config.particle_edge;
        let state: &mut State = &mut self.arena;

        for id in state.creature_pool.iter_live() {
            let c = &state.creatures[id.index()];
            c.species.decode()?;
            let (next, _) = step(c.position, c.velocity, dt, &min, &max, creature_edge);
            if !next.iter().all(|v| v.is_finite()) {
                return Err(SimError::UnstableMotion { id });
            }
        }
        for id in state.particle_pool.iter_live() {
            let p = &state.particles[id.index()];
            let (next, _) = step(p.position, p.velocity, dt, &min, &max, particle_edge);
            if p.ttl > 1 && !next.iter().all(|v| v.is_finite()) {
                return Err(SimError::UnstableMotion { id });
            }
        }

        let mut creatures =
            Hashspace::<Planar, _>::attach(&self.creature_shells, &mut state.creature_grid)?;
        for slot in 0..MAX_CREATURES {
            let id = ObjectId(slot as u32);
            if !state.creature_pool.is_live(id) {
                continue;
            }
            let c = &mut state.creatures[slot];
            (c.position, c.velocity) =
                step(c.position, c.velocity, dt, &min, &max, creature_edge);
            creatures.insert_or_update(id, Vec2::from_array(c.position))?;
        }

        self.sediment.clear();
        let mut particles =
            Hashspace::<Volumetric, _>::attach(&self.particle_shells, &mut state.particle_grid)?;
        for slot in 0..MAX_PARTICLES {
            let id = ObjectId(slot as u32);
            if !state.particle_pool.is_live(id) {
                continue;
            }
            let p = &mut state.particles[slot];
            if p.ttl <= 1 {
                self.sediment.push([p.position[0], p.position[1]]);
                particles.remove(id)?;
                state.particle_pool.release(id)?;
                *p = Particle::default();
                continue;
            }
            p.ttl -= 1;
            (p.position, p.velocity) =
                step(p.position, p.velocity, dt, &min, &max, particle_edge);
            particles.insert_or_update(id, Vec3::from_array(p.position))?;
        }
        let reindex_us = start.elapsed().as_micros() as u64;

        let fields_start = Instant::now();
        let (field_min, field_max) = ([min[0], min[1]], [max[0], max[1]]);
        let shape = State::FIELD_SHAPE;

        let mut pass = state.pheromone.begin_pass();
        let (previous, next) = pass.split();
        diffuse(previous, next, shape, self.config.pheromone, self.workers);
        for id in state.creature_pool.iter_live() {
            let c = &state.creatures[id.index()];
            if let Species::Ant { carrying: true, .. } = c.species.decode()? {
                next[cell_of(shape, c.position, field_min, field_max, creature_edge)] +=
                    self.config.pheromone_deposit;
            }
        }
        pass.commit();

        let mut pass = state.height.begin_pass();
        let (previous, next) = pass.split();
        diffuse(previous, next, shape, self.config.height, self.workers);
        for &position in &self.sediment {
            next[cell_of(shape, position, field_min, field_max, particle_edge)] +=
                self.config.sediment;
        }
        pass.commit();
        let diffusion_us = fields_start.elapsed().as_micros() as u64;

        let tick = state.params.tick() + 1;
        state.params.set_tick(tick);

        let metrics = TickMetrics {
            tick,
            total_us: start.elapsed().as_micros() as u64,
            reindex_us,
            diffusion_us,
            creatures: state.creature_pool.live_count(),
            particles: state.particle_pool.live_count(),
            expired_particles: self.sediment.len(),
            workers: self.workers,
        };
        tracing::trace!(
            tick,
            total_us = metrics.total_us,
            reindex_us,
            diffusion_us,
            creatures = metrics.creatures,
            particles = metrics.particles,
            "tick complete"
        );
        self.last_metrics = metrics.clone();
        Ok(metrics)
    }

    /// Write dirty state back to the file without unmapping.
    pub fn flush(&self) -> Result<(), SimError> {
        Ok(self.arena.flush()?)
    }

    /// Run the host's [`on_finalize`](Host::on_finalize) hook, then unmap
    /// the state, flushing first if `flush` is set.
    pub fn finalize<H: Host + ?Sized>(self, host: &mut H, flush: bool) -> Result<(), SimError> {
        host.on_finalize(&self)?;
        tracing::info!(
            tick = self.tick(),
            creatures = self.creature_count(),
            particles = self.particle_count(),
            flushed = flush,
            "simulation finalized"
        );
        self.arena.destroy(flush)?;
        Ok(())
    }
}

impl std::fmt::Debug for SimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimContext")
            .field("arena", &self.arena)
            .field("tick", &self.tick())
            .field("workers", &self.workers)
            .finish()
    }
}

fn check_velocity<const D: usize>(velocity: &[f32; D]) -> Result<(), SimError> {
    if velocity.iter().all(|v| v.is_finite()) {
        return Ok(());
    }
    let mut padded = [0.0; 3];
    padded[..D].copy_from_slice(velocity);
    Err(SimError::InvalidVelocity { velocity: padded })
}

/// Integrate one tick of motion and confine the result.
fn step<const D: usize>(
    mut position: [f32; D],
    mut velocity: [f32; D],
    dt: f32,
    min: &[f32; 3],
    max: &[f32; 3],
    edge: EdgeBehavior,
) -> ([f32; D], [f32; D]) {
    for axis in 0..D {
        position[axis] += velocity[axis] * dt;
    }
    confine(&mut position, &mut velocity, min, max, edge);
    (position, velocity)
}

/// Fold (wrap) or clamp (bounded) `position` into the world. Clamping an
/// axis also stops motion along it.
fn confine<const D: usize>(
    position: &mut [f32; D],
    velocity: &mut [f32; D],
    min: &[f32; 3],
    max: &[f32; 3],
    edge: EdgeBehavior,
) {
    for axis in 0..D {
        let (lo, hi) = (min[axis], max[axis]);
        match edge {
            EdgeBehavior::Wrap => {
                position[axis] = lo + (position[axis] - lo).rem_euclid(hi - lo);
            }
            EdgeBehavior::Bounded => {
                if position[axis] < lo {
                    position[axis] = lo;
                    velocity[axis] = 0.0;
                } else if position[axis] > hi {
                    position[axis] = hi;
                    velocity[axis] = 0.0;
                }
            }
        }
    }
}
