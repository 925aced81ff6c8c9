//! Lazy iterators over voxel chains and radius queries.

use std::iter::FusedIterator;

use vivarium_core::{ObjectId, NIL};

use crate::edge::EdgeBehavior;
use crate::error::SpaceError;
use crate::lattice::Lattice;
use crate::shell::ShellTable;
use crate::store::Object;
use crate::transform::GridTransform;

/// Slack, in voxel units, added to the pruning radius so that rounding in
/// the world → voxel transform can never prune a shell holding a hit.
const PRUNE_SLACK: f32 = 0.01;

/// Iterator over the members of one voxel chain, head first.
pub struct Chain<'a> {
    objects: &'a [Object],
    cursor: u32,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(objects: &'a [Object], head: u32) -> Self {
        Self {
            objects,
            cursor: head,
        }
    }
}

impl Iterator for Chain<'_> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        let idx = self.cursor;
        let obj = self.objects.get(idx as usize)?;
        self.cursor = obj.next;
        Some(ObjectId(idx))
    }
}

impl FusedIterator for Chain<'_> {}

/// Ids within a radius of a point, produced lazily.
///
/// Walks shells outward from the query's voxel and stops once the next
/// shell's minimum distance exceeds the radius. The sequence is finite and
/// is consumed as it is iterated; issue a new query to start over. Nothing
/// is allocated.
pub struct QueryRadius<'a, L: Lattice> {
    objects: &'a [Object],
    heads: &'a [u32],
    shells: &'a ShellTable,
    transform: &'a GridTransform<L>,
    center: [f32; 3],
    origin: [i32; 3],
    radius_sq: f32,
    prune_sq: Option<f32>,
    shell: usize,
    next_offset: u32,
    cursor: u32,
    voxels_visited: usize,
    finished: bool,
}

impl<'a, L: Lattice> QueryRadius<'a, L> {
    pub(crate) fn new(
        objects: &'a [Object],
        heads: &'a [u32],
        shells: &'a ShellTable,
        transform: &'a GridTransform<L>,
        center: L::Point,
        radius: f32,
        prune: bool,
    ) -> Result<Self, SpaceError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SpaceError::InvalidRadius { radius });
        }
        let center = L::to_axes(center);
        let voxel = transform.voxel_of(center)?;
        let origin = [voxel[0] as i32, voxel[1] as i32, voxel[2] as i32];

        let prune_sq = prune.then(|| {
            let limit = radius * transform.scale() + PRUNE_SLACK;
            limit * limit
        });

        Ok(Self {
            objects,
            heads,
            shells,
            transform,
            center,
            origin,
            radius_sq: radius * radius,
            prune_sq,
            shell: 0,
            next_offset: 0,
            cursor: NIL,
            voxels_visited: 0,
            finished: false,
        })
    }

    /// Number of voxels whose chains have been opened so far.
    pub fn voxels_visited(&self) -> usize {
        self.voxels_visited
    }

    /// Move `cursor` to the head of the next voxel worth visiting.
    fn advance_voxel(&mut self) -> bool {
        if self.finished {
            return false;
        }
        let shells = self.shells.shells();
        let r = self.transform.resolution() as i32;
        let wrap = self.transform.edge() == EdgeBehavior::Wrap;

        loop {
            let Some(shell) = shells.get(self.shell) else {
                self.finished = true;
                return false;
            };
            if self.next_offset == shell.start {
                if let Some(limit) = self.prune_sq {
                    if shell.ring as f32 > limit {
                        self.finished = true;
                        return false;
                    }
                }
            }
            if self.next_offset >= shell.end {
                self.shell += 1;
                continue;
            }

            let offset = self.shells.offset(self.next_offset);
            self.next_offset += 1;

            let mut coord = [0u32; 3];
            let mut inside = true;
            for axis in 0..L::NDIM {
                let c = self.origin[axis] + offset[axis];
                if wrap {
                    coord[axis] = c.rem_euclid(r) as u32;
                } else if (0..r).contains(&c) {
                    coord[axis] = c as u32;
                } else {
                    inside = false;
                    break;
                }
            }
            if !inside {
                continue;
            }

            self.voxels_visited += 1;
            self.cursor = self.heads[self.transform.hash(coord).index()];
            return true;
        }
    }
}

impl<L: Lattice> Iterator for QueryRadius<'_, L> {
    type Item = ObjectId;

    fn next(&mut self) -> Option<ObjectId> {
        loop {
            while self.cursor != NIL {
                let idx = self.cursor;
                let Some(obj) = self.objects.get(idx as usize) else {
                    self.cursor = NIL;
                    break;
                };
                self.cursor = obj.next;
                if self.transform.distance_sq(self.center, obj.position) <= self.radius_sq {
                    return Some(ObjectId(idx));
                }
            }
            if !self.advance_voxel() {
                return None;
            }
        }
    }
}

impl<L: Lattice> FusedIterator for QueryRadius<'_, L> {}
