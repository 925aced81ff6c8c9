//! The spatial hash grid.

use vivarium_core::{ObjectId, VoxelHash, NIL};

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::lattice::Lattice;
use crate::query::{Chain, QueryRadius};
use crate::shell::ShellTable;
use crate::store::{GridFrame, Object, StoreParts, VoxelStore, VoxelStoreMut};
use crate::transform::GridTransform;

/// Fixed-capacity spatial hash over a [`VoxelStore`].
///
/// Every slot id in `0..capacity` is either unassigned or linked into
/// exactly one voxel chain, the one containing its last recorded
/// position. The grid borrows its [`ShellTable`] so many grids of the same
/// shape can share one table.
///
/// A freshly attached store that has never been reset rejects inserts and
/// queries with [`SpaceError::NotReset`]. Attaching a store that was reset
/// in a previous run (for example one mapped from a file) picks up its
/// persisted bounds without another reset.
///
/// # Examples
///
/// ```
/// use glam::Vec2;
/// use vivarium_core::ObjectId;
/// use vivarium_space::{EdgeBehavior, Hashspace, HeapVoxelStore, Planar, ShellTable};
///
/// let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
/// let store = HeapVoxelStore::new(8, shells.voxel_count());
/// let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
/// grid.reset(Vec2::ZERO, Vec2::splat(450.0)).unwrap();
///
/// grid.insert_or_update(ObjectId(0), Vec2::new(449.0, 10.0)).unwrap();
/// let hits: Vec<_> = grid.query_radius(Vec2::new(1.0, 10.0), 5.0).unwrap().collect();
/// assert_eq!(hits, vec![ObjectId(0)]);
/// ```
pub struct Hashspace<'t, L: Lattice, S: VoxelStore> {
    shells: &'t ShellTable,
    store: S,
    transform: Option<GridTransform<L>>,
}

impl<'t, L: Lattice, S: VoxelStore> Hashspace<'t, L, S> {
    /// Wrap `store` as a grid shaped by `shells`.
    ///
    /// Fails if the table's dimensionality differs from `L`, if the store
    /// has the wrong number of voxel heads, or if a persisted frame names
    /// a different resolution or edge behavior.
    pub fn attach(shells: &'t ShellTable, store: S) -> Result<Self, SpaceError> {
        if shells.ndim() != L::NDIM {
            return Err(SpaceError::DimensionMismatch {
                table: shells.ndim(),
                lattice: L::NDIM,
            });
        }
        if store.heads().len() != shells.voxel_count() {
            return Err(SpaceError::StoreMismatch {
                reason: format!(
                    "store has {} voxel heads, table expects {}",
                    store.heads().len(),
                    shells.voxel_count()
                ),
            });
        }
        if store.objects().len() >= NIL as usize {
            return Err(SpaceError::StoreMismatch {
                reason: format!("{} object slots exceed the id space", store.objects().len()),
            });
        }

        let frame = *store.frame();
        let transform = if frame.ready != 0 {
            Some(Self::persisted_transform(shells, &frame)?)
        } else {
            None
        };

        Ok(Self {
            shells,
            store,
            transform,
        })
    }

    fn persisted_transform(
        shells: &ShellTable,
        frame: &GridFrame,
    ) -> Result<GridTransform<L>, SpaceError> {
        if frame.resolution != shells.resolution() {
            return Err(SpaceError::StoreMismatch {
                reason: format!(
                    "persisted resolution {} differs from table resolution {}",
                    frame.resolution,
                    shells.resolution()
                ),
            });
        }
        if EdgeBehavior::from_code(frame.edge) != Some(shells.edge()) {
            return Err(SpaceError::StoreMismatch {
                reason: format!("persisted edge code {} differs from table", frame.edge),
            });
        }
        GridTransform::from_bounds(
            L::from_axes(frame.min),
            L::from_axes(frame.max),
            frame.resolution,
            shells.edge(),
        )
    }

    /// Whether [`reset`](Self::reset) has run on this store.
    pub fn is_reset(&self) -> bool {
        self.transform.is_some()
    }

    /// The world ↔ voxel transform.
    pub fn transform(&self) -> Result<&GridTransform<L>, SpaceError> {
        self.transform.as_ref().ok_or(SpaceError::NotReset)
    }

    /// The shell table driving queries.
    pub fn shells(&self) -> &'t ShellTable {
        self.shells
    }

    /// Number of object slots.
    pub fn capacity(&self) -> usize {
        self.store.objects().len()
    }

    /// Number of linked entities.
    pub fn len(&self) -> usize {
        self.store.frame().active as usize
    }

    /// Whether no entity is linked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, id: ObjectId) -> Result<&Object, SpaceError> {
        if self.transform.is_none() {
            return Err(SpaceError::NotReset);
        }
        self.store
            .objects()
            .get(id.index())
            .ok_or(SpaceError::IdOutOfRange {
                id,
                capacity: self.capacity(),
            })
    }

    /// Whether `id` is currently linked. Out-of-range ids are never linked.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.record(id).is_ok_and(Object::is_linked)
    }

    /// The voxel `id` is linked under, or [`VoxelHash::UNASSIGNED`].
    pub fn hash_of(&self, id: ObjectId) -> Result<VoxelHash, SpaceError> {
        self.record(id).map(Object::voxel)
    }

    /// Last position recorded for `id`.
    ///
    /// Positions survive [`remove`](Self::remove) and
    /// [`clear`](Self::clear).
    pub fn position_of(&self, id: ObjectId) -> Result<L::Point, SpaceError> {
        self.record(id).map(|o| L::from_axes(o.position))
    }

    /// Iterate the chain of one voxel. Unknown hashes yield nothing.
    pub fn chain(&self, hash: VoxelHash) -> Chain<'_> {
        let head = if self.transform.is_some() {
            self.store.heads().get(hash.index()).copied().unwrap_or(NIL)
        } else {
            NIL
        };
        Chain::new(self.store.objects(), head)
    }

    /// Ids of every linked entity, in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = ObjectId> + '_ {
        let ready = self.transform.is_some();
        self.store
            .objects()
            .iter()
            .enumerate()
            .filter(move |(_, o)| ready && o.is_linked())
            .map(|(i, _)| ObjectId(i as u32))
    }

    /// Lazily yield every linked id within `radius` of `position`.
    ///
    /// The boundary is inclusive. Distances are measured the short way
    /// around a wrapped world. Order is by voxel shell, then chain order,
    /// and is otherwise unspecified.
    pub fn query_radius(
        &self,
        position: L::Point,
        radius: f32,
    ) -> Result<QueryRadius<'_, L>, SpaceError> {
        self.query(position, radius, true)
    }

    /// Same hits as [`query_radius`](Self::query_radius), but visits every
    /// voxel instead of stopping at the first out-of-range shell.
    pub fn query_radius_full(
        &self,
        position: L::Point,
        radius: f32,
    ) -> Result<QueryRadius<'_, L>, SpaceError> {
        self.query(position, radius, false)
    }

    fn query(
        &self,
        position: L::Point,
        radius: f32,
        prune: bool,
    ) -> Result<QueryRadius<'_, L>, SpaceError> {
        let transform = self.transform.as_ref().ok_or(SpaceError::NotReset)?;
        QueryRadius::new(
            self.store.objects(),
            self.store.heads(),
            self.shells,
            transform,
            position,
            radius,
            prune,
        )
    }

    /// Walk every chain and verify linkage, hashes and the live count.
    pub fn check_invariants(&self) -> Result<(), SpaceError> {
        let transform = self.transform.as_ref().ok_or(SpaceError::NotReset)?;
        let objects = self.store.objects();
        let heads = self.store.heads();
        let mut seen = vec![false; objects.len()];
        let mut linked = 0usize;

        for (voxel, &head) in heads.iter().enumerate() {
            let mut prev = NIL;
            let mut cursor = head;
            while cursor != NIL {
                let idx = cursor as usize;
                let Some(obj) = objects.get(idx) else {
                    return Err(corrupt(format!(
                        "voxel {voxel} links to missing record {cursor}"
                    )));
                };
                if seen[idx] {
                    return Err(corrupt(format!("record {cursor} reached twice")));
                }
                seen[idx] = true;
                if obj.hash as usize != voxel {
                    return Err(corrupt(format!(
                        "record {cursor} in voxel {voxel} claims hash {}",
                        obj.hash
                    )));
                }
                if obj.prev != prev {
                    return Err(corrupt(format!(
                        "record {cursor} has prev {} but follows {prev}",
                        obj.prev
                    )));
                }
                let expected = transform.voxel_of(obj.position)?;
                if transform.hash(expected).index() != voxel {
                    return Err(corrupt(format!(
                        "record {cursor} is filed under voxel {voxel} but lies in {}",
                        transform.hash(expected)
                    )));
                }
                linked += 1;
                prev = cursor;
                cursor = obj.next;
            }
        }

        if let Some(i) = (0..objects.len()).find(|&i| objects[i].is_linked() && !seen[i]) {
            return Err(corrupt(format!(
                "record {i} claims voxel {} but is absent from its chain",
                objects[i].hash
            )));
        }
        let active = self.store.frame().active as usize;
        if linked != active {
            return Err(corrupt(format!(
                "{linked} records linked but frame counts {active}"
            )));
        }
        Ok(())
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give back the backing store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<L: Lattice, S: VoxelStoreMut> Hashspace<'_, L, S> {
    /// Forget every entity and re-derive the transform from `[min, max]`.
    ///
    /// Stored positions are kept; chain links, hashes and the live count
    /// are cleared. Required once before any insert or query on a store
    /// that has never been reset.
    pub fn reset(&mut self, min: L::Point, max: L::Point) -> Result<(), SpaceError> {
        let transform =
            GridTransform::from_bounds(min, max, self.shells.resolution(), self.shells.edge())?;
        let StoreParts {
            frame,
            objects,
            heads,
        } = self.store.parts_mut();

        *frame = GridFrame {
            min: L::to_axes(min),
            max: L::to_axes(max),
            resolution: self.shells.resolution(),
            ready: 1,
            active: 0,
            edge: self.shells.edge().code(),
        };
        for (i, obj) in objects.iter_mut().enumerate() {
            obj.id = i as u32;
            obj.next = NIL;
            obj.prev = NIL;
            obj.hash = NIL;
        }
        heads.fill(NIL);

        tracing::debug!(
            ndim = L::NDIM,
            resolution = self.shells.resolution(),
            edge = ?self.shells.edge(),
            capacity = objects.len(),
            "hashspace reset"
        );
        self.transform = Some(transform);
        Ok(())
    }

    /// Record `position` for `id` and file it under the matching voxel.
    ///
    /// The chain is only touched when the voxel changes. Non-finite
    /// positions are rejected, as are positions outside a bounded world.
    pub fn insert_or_update(&mut self, id: ObjectId, position: L::Point) -> Result<(), SpaceError> {
        let transform = self.transform.as_ref().ok_or(SpaceError::NotReset)?;
        let capacity = self.store.objects().len();
        if id.index() >= capacity {
            return Err(SpaceError::IdOutOfRange { id, capacity });
        }
        let axes = L::to_axes(position);
        let hash = transform.hash(transform.voxel_of(axes)?).0;

        let StoreParts {
            frame,
            objects,
            heads,
        } = self.store.parts_mut();
        let slot = id.0;
        objects[id.index()].position = axes;

        let previous = objects[id.index()].hash;
        if previous == hash {
            return Ok(());
        }
        if previous == NIL {
            frame.active += 1;
        } else {
            unlink(objects, heads, slot);
        }
        link(objects, heads, slot, hash);
        Ok(())
    }

    /// Unlink `id`. Removing an unassigned id is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Result<(), SpaceError> {
        if !self.record(id)?.is_linked() {
            return Ok(());
        }
        let StoreParts {
            frame,
            objects,
            heads,
        } = self.store.parts_mut();
        unlink(objects, heads, id.0);
        frame.active -= 1;
        Ok(())
    }

    /// Unlink every entity while keeping the bounds and stored positions.
    pub fn clear(&mut self) -> Result<(), SpaceError> {
        if self.transform.is_none() {
            return Err(SpaceError::NotReset);
        }
        let StoreParts {
            frame,
            objects,
            heads,
        } = self.store.parts_mut();
        for obj in objects.iter_mut() {
            obj.next = NIL;
            obj.prev = NIL;
            obj.hash = NIL;
        }
        heads.fill(NIL);
        frame.active = 0;
        Ok(())
    }

    /// Clear the grid, then insert every `(id, position)` pair in order.
    ///
    /// Stops at the first rejected pair; entries before it stay linked.
    pub fn rebuild<I>(&mut self, entries: I) -> Result<(), SpaceError>
    where
        I: IntoIterator<Item = (ObjectId, L::Point)>,
    {
        self.clear()?;
        for (id, position) in entries {
            self.insert_or_update(id, position)?;
        }
        tracing::trace!(active = self.len(), "hashspace rebuilt");
        Ok(())
    }
}

fn corrupt(reason: String) -> SpaceError {
    SpaceError::Corrupt { reason }
}

/// Push `slot` onto the front of voxel `hash`'s chain.
fn link(objects: &mut [Object], heads: &mut [u32], slot: u32, hash: u32) {
    let head = heads[hash as usize];
    if head != NIL {
        objects[head as usize].prev = slot;
    }
    let obj = &mut objects[slot as usize];
    obj.next = head;
    obj.prev = NIL;
    obj.hash = hash;
    heads[hash as usize] = slot;
}

/// Detach `slot` from its chain, leaving it unassigned.
fn unlink(objects: &mut [Object], heads: &mut [u32], slot: u32) {
    let Object {
        next, prev, hash, ..
    } = objects[slot as usize];
    if prev == NIL {
        heads[hash as usize] = next;
    } else {
        objects[prev as usize].next = next;
    }
    if next != NIL {
        objects[next as usize].prev = prev;
    }
    let obj = &mut objects[slot as usize];
    obj.next = NIL;
    obj.prev = NIL;
    obj.hash = NIL;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{Planar, Volumetric};
    use crate::store::{FixedVoxelStore, HeapVoxelStore};
    use glam::{Vec2, Vec3};

    fn grid_2d(shells: &ShellTable, capacity: usize) -> Hashspace<'_, Planar, HeapVoxelStore> {
        let store = HeapVoxelStore::new(capacity, shells.voxel_count());
        let mut grid = Hashspace::attach(shells, store).unwrap();
        grid.reset(Vec2::ZERO, Vec2::splat(450.0)).unwrap();
        grid
    }

    fn sorted(iter: impl Iterator<Item = ObjectId>) -> Vec<u32> {
        let mut ids: Vec<u32> = iter.map(|id| id.0).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn unreset_store_rejects_use() {
        let shells = ShellTable::new(2, 8, EdgeBehavior::Wrap).unwrap();
        let store = HeapVoxelStore::new(4, shells.voxel_count());
        let mut grid = Hashspace::<Planar, _>::attach(&shells, store).unwrap();
        assert!(!grid.is_reset());
        assert_eq!(
            grid.insert_or_update(ObjectId(0), Vec2::ZERO),
            Err(SpaceError::NotReset)
        );
        assert!(matches!(
            grid.query_radius(Vec2::ZERO, 1.0),
            Err(SpaceError::NotReset)
        ));
        assert_eq!(grid.remove(ObjectId(0)), Err(SpaceError::NotReset));
        assert!(!grid.contains(ObjectId(0)));
    }

    #[test]
    fn attach_checks_shape() {
        let shells = ShellTable::new(3, 4, EdgeBehavior::Wrap).unwrap();
        let store = HeapVoxelStore::new(4, shells.voxel_count());
        assert!(matches!(
            Hashspace::<Planar, _>::attach(&shells, store),
            Err(SpaceError::DimensionMismatch {
                table: 3,
                lattice: 2
            })
        ));

        let shells = ShellTable::new(2, 4, EdgeBehavior::Wrap).unwrap();
        let store = HeapVoxelStore::new(4, 15);
        assert!(matches!(
            Hashspace::<Planar, _>::attach(&shells, store),
            Err(SpaceError::StoreMismatch { .. })
        ));
    }

    #[test]
    fn wrap_query_finds_neighbour_across_seam() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 4);
        grid.insert_or_update(ObjectId(0), Vec2::new(449.0, 200.0))
            .unwrap();
        grid.insert_or_update(ObjectId(1), Vec2::new(20.0, 200.0))
            .unwrap();

        let hits = sorted(grid.query_radius(Vec2::new(1.0, 200.0), 5.0).unwrap());
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Bounded).unwrap();
        let mut grid = grid_2d(&shells, 2);
        grid.insert_or_update(ObjectId(0), Vec2::new(103.0, 104.0))
            .unwrap();
        let hits = sorted(grid.query_radius(Vec2::new(100.0, 100.0), 5.0).unwrap());
        assert_eq!(hits, vec![0]);
        let hits = sorted(grid.query_radius(Vec2::new(100.0, 100.0), 4.99).unwrap());
        assert!(hits.is_empty());
    }

    #[test]
    fn update_within_voxel_keeps_chain() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 4);
        grid.insert_or_update(ObjectId(2), Vec2::new(11.0, 11.0))
            .unwrap();
        let before = grid.hash_of(ObjectId(2)).unwrap();
        grid.insert_or_update(ObjectId(2), Vec2::new(19.0, 12.0))
            .unwrap();
        assert_eq!(grid.hash_of(ObjectId(2)).unwrap(), before);
        assert_eq!(
            grid.position_of(ObjectId(2)).unwrap(),
            Vec2::new(19.0, 12.0)
        );
        assert_eq!(grid.len(), 1);

        grid.insert_or_update(ObjectId(2), Vec2::new(300.0, 12.0))
            .unwrap();
        assert_ne!(grid.hash_of(ObjectId(2)).unwrap(), before);
        assert_eq!(grid.chain(before).count(), 0);
        assert_eq!(grid.len(), 1);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn remove_is_idempotent() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 4);
        for i in 0..3 {
            grid.insert_or_update(ObjectId(i), Vec2::new(50.0, 50.0))
                .unwrap();
        }
        let hash = grid.hash_of(ObjectId(1)).unwrap();
        assert_eq!(grid.chain(hash).count(), 3);

        grid.remove(ObjectId(1)).unwrap();
        grid.remove(ObjectId(1)).unwrap();
        assert_eq!(grid.len(), 2);
        assert!(!grid.contains(ObjectId(1)));
        assert_eq!(grid.hash_of(ObjectId(1)).unwrap(), VoxelHash::UNASSIGNED);
        assert_eq!(sorted(grid.chain(hash)), vec![0, 2]);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn id_out_of_range_is_reported() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 4);
        assert_eq!(
            grid.insert_or_update(ObjectId(4), Vec2::ZERO),
            Err(SpaceError::IdOutOfRange {
                id: ObjectId(4),
                capacity: 4
            })
        );
        assert!(!grid.contains(ObjectId(99)));
    }

    #[test]
    fn bounded_rejects_outside_positions() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Bounded).unwrap();
        let mut grid = grid_2d(&shells, 4);
        assert!(matches!(
            grid.insert_or_update(ObjectId(0), Vec2::new(-1.0, 3.0)),
            Err(SpaceError::OutOfBounds { .. })
        ));
        assert_eq!(
            grid.insert_or_update(ObjectId(0), Vec2::new(f32::NAN, 3.0)),
            Err(SpaceError::NonFinitePosition)
        );
        grid.insert_or_update(ObjectId(0), Vec2::new(450.0, 450.0))
            .unwrap();
        assert!(grid.contains(ObjectId(0)));
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let grid = grid_2d(&shells, 1);
        assert!(matches!(
            grid.query_radius(Vec2::ZERO, -1.0),
            Err(SpaceError::InvalidRadius { .. })
        ));
        assert!(matches!(
            grid.query_radius(Vec2::ZERO, f32::NAN),
            Err(SpaceError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn pruned_query_visits_few_voxels() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 1);
        grid.insert_or_update(ObjectId(0), Vec2::new(100.0, 100.0))
            .unwrap();

        let mut pruned = grid.query_radius(Vec2::new(100.0, 100.0), 5.0).unwrap();
        assert_eq!(pruned.next(), Some(ObjectId(0)));
        assert_eq!(pruned.next(), None);
        assert_eq!(pruned.next(), None);
        assert!(pruned.voxels_visited() <= 9);

        let mut full = grid
            .query_radius_full(Vec2::new(100.0, 100.0), 5.0)
            .unwrap();
        assert_eq!(full.by_ref().count(), 1);
        assert_eq!(full.voxels_visited(), 45 * 45);
    }

    #[test]
    fn reset_keeps_positions_clear_keeps_bounds() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 2);
        grid.insert_or_update(ObjectId(1), Vec2::new(7.0, 8.0))
            .unwrap();

        grid.clear().unwrap();
        assert!(grid.is_empty());
        assert!(grid.is_reset());
        assert_eq!(grid.iter_active().count(), 0);

        grid.reset(Vec2::ZERO, Vec2::splat(90.0)).unwrap();
        assert_eq!(grid.position_of(ObjectId(1)).unwrap(), Vec2::new(7.0, 8.0));
        assert_eq!(grid.transform().unwrap().scale(), 0.5);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let shells = ShellTable::new(2, 45, EdgeBehavior::Wrap).unwrap();
        let mut grid = grid_2d(&shells, 8);
        grid.insert_or_update(ObjectId(7), Vec2::new(1.0, 1.0))
            .unwrap();
        grid.rebuild([
            (ObjectId(0), Vec2::new(10.0, 10.0)),
            (ObjectId(3), Vec2::new(400.0, 30.0)),
        ])
        .unwrap();
        assert_eq!(sorted(grid.iter_active()), vec![0, 3]);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn fixed_store_persists_frame_across_attach() {
        let shells = ShellTable::new(3, 4, EdgeBehavior::Bounded).unwrap();
        let mut store: Box<FixedVoxelStore<8, 64>> = bytemuck::zeroed_box();
        {
            let mut grid = Hashspace::<Volumetric, _>::attach(&shells, &mut *store).unwrap();
            grid.reset(Vec3::ZERO, Vec3::splat(8.0)).unwrap();
            grid.insert_or_update(ObjectId(5), Vec3::new(7.0, 1.0, 3.0))
                .unwrap();
        }

        let grid = Hashspace::<Volumetric, _>::attach(&shells, &*store).unwrap();
        assert!(grid.is_reset());
        assert!(grid.contains(ObjectId(5)));
        let hits = sorted(grid.query_radius(Vec3::new(6.0, 1.0, 3.0), 1.5).unwrap());
        assert_eq!(hits, vec![5]);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn persisted_frame_must_match_table() {
        let shells = ShellTable::new(2, 4, EdgeBehavior::Wrap).unwrap();
        let mut store = HeapVoxelStore::new(2, shells.voxel_count());
        Hashspace::<Planar, _>::attach(&shells, &mut store)
            .unwrap()
            .reset(Vec2::ZERO, Vec2::ONE)
            .unwrap();

        let bounded = ShellTable::new(2, 4, EdgeBehavior::Bounded).unwrap();
        assert!(matches!(
            Hashspace::<Planar, _>::attach(&bounded, &store),
            Err(SpaceError::StoreMismatch { .. })
        ));
    }

    #[test]
    fn check_invariants_detects_broken_links() {
        let shells = ShellTable::new(2, 4, EdgeBehavior::Wrap).unwrap();
        let mut store = HeapVoxelStore::new(2, shells.voxel_count());
        {
            let mut grid = Hashspace::<Planar, _>::attach(&shells, &mut store).unwrap();
            grid.reset(Vec2::ZERO, Vec2::splat(4.0)).unwrap();
            grid.insert_or_update(ObjectId(0), Vec2::new(0.5, 0.5))
                .unwrap();
        }
        store.parts_mut().frame.active = 2;
        let grid = Hashspace::<Planar, _>::attach(&shells, &store).unwrap();
        assert!(matches!(
            grid.check_invariants(),
            Err(SpaceError::Corrupt { .. })
        ));
    }
}
