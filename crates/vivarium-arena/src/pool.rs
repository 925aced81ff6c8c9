//! LIFO free-list allocator for fixed slot ids.
//!
//! [`FreeList`] hands out ids in `0..N` from a stack of free ids. Each
//! slot also carries a generation counter that is odd while the slot is
//! live, so releasing a free slot is caught instead of pushing a
//! duplicate onto the stack.

use vivarium_core::ObjectId;

use crate::error::PoolError;

/// Fixed-capacity slot allocator.
///
/// `stack[..top]` holds the free ids; the most recently released id is on
/// top and is handed out next. The layout is plain-old-data, but a zeroed
/// image is "full and empty at once": call [`reset`](Self::reset) (or
/// build with [`new`](Self::new)) before first use.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FreeList<const N: usize> {
    top: u32,
    stack: [u32; N],
    generations: [u32; N],
}

impl<const N: usize> FreeList<N> {
    /// A pool with every slot free. Slot 0 is allocated first.
    pub const fn new() -> Self {
        let mut stack = [0u32; N];
        let mut i = 0;
        while i < N {
            stack[i] = (N - 1 - i) as u32;
            i += 1;
        }
        Self {
            top: N as u32,
            stack,
            generations: [0; N],
        }
    }

    /// Free every slot.
    ///
    /// Generations advance to the next even value so stale ids from
    /// before the reset stay distinguishable.
    pub fn reset(&mut self) {
        for (i, slot) in self.stack.iter_mut().enumerate() {
            *slot = (N - 1 - i) as u32;
        }
        for gen in &mut self.generations {
            *gen = gen.wrapping_add(*gen & 1);
        }
        self.top = N as u32;
    }

    /// Pop a free id.
    ///
    /// [`PoolError::Exhausted`] is an ordinary outcome when every slot is
    /// live.
    pub fn allocate(&mut self) -> Result<ObjectId, PoolError> {
        if self.top == 0 {
            tracing::debug!(capacity = N, "free list exhausted");
            return Err(PoolError::Exhausted { capacity: N });
        }
        self.top -= 1;
        let id = self.stack[self.top as usize];
        self.generations[id as usize] = self.generations[id as usize].wrapping_add(1);
        Ok(ObjectId(id))
    }

    /// Return a live id to the pool.
    pub fn release(&mut self, id: ObjectId) -> Result<(), PoolError> {
        let slot = self.slot(id)?;
        if self.generations[slot] & 1 == 0 {
            return Err(PoolError::NotAllocated { id });
        }
        if self.top as usize >= N {
            return Err(PoolError::Corrupt {
                reason: format!("live id {id} released into a full free stack"),
            });
        }
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.stack[self.top as usize] = id.0;
        self.top += 1;
        Ok(())
    }

    fn slot(&self, id: ObjectId) -> Result<usize, PoolError> {
        if id.index() < N {
            Ok(id.index())
        } else {
            Err(PoolError::OutOfRange { id, capacity: N })
        }
    }

    /// Whether `id` is currently allocated.
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.slot(id)
            .is_ok_and(|slot| self.generations[slot] & 1 == 1)
    }

    /// Generation counter of `id`: odd while live.
    pub fn generation(&self, id: ObjectId) -> Option<u32> {
        self.slot(id).ok().map(|slot| self.generations[slot])
    }

    /// Number of live slots.
    pub fn live_count(&self) -> usize {
        N - self.top as usize
    }

    /// Number of free slots.
    pub fn available(&self) -> usize {
        self.top as usize
    }

    /// Total slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Live ids in slot order.
    pub fn iter_live(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, gen)| **gen & 1 == 1)
            .map(|(i, _)| ObjectId(i as u32))
    }

    /// Check that the free stack and generations agree.
    ///
    /// Run on images read back from disk, where a crash mid-write can leave
    /// the two halves out of step.
    pub fn verify(&self) -> Result<(), PoolError> {
        let top = self.top as usize;
        if top > N {
            return Err(PoolError::Corrupt {
                reason: format!("free count {top} exceeds capacity {N}"),
            });
        }
        let mut on_stack = vec![false; N];
        for &id in &self.stack[..top] {
            let slot = id as usize;
            if slot >= N || on_stack[slot] {
                return Err(PoolError::Corrupt {
                    reason: format!("free stack holds bad or repeated id {id}"),
                });
            }
            if self.generations[slot] & 1 == 1 {
                return Err(PoolError::Corrupt {
                    reason: format!("id {id} is on the free stack but live"),
                });
            }
            on_stack[slot] = true;
        }
        if self.live_count() != self.iter_live().count() {
            return Err(PoolError::Corrupt {
                reason: "live generations disagree with free count".into(),
            });
        }
        Ok(())
    }
}

impl<const N: usize> Default for FreeList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for FreeList<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreeList")
            .field("capacity", &N)
            .field("available", &self.available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn allocates_capacity_then_exhausts() {
        let mut pool = FreeList::<4>::new();
        let ids: Vec<_> = (0..4).map(|_| pool.allocate().unwrap()).collect();
        assert_eq!(ids, vec![ObjectId(0), ObjectId(1), ObjectId(2), ObjectId(3)]);
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted { capacity: 4 }));
        assert_eq!(pool.live_count(), 4);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn released_id_is_reused_first() {
        let mut pool = FreeList::<8>::new();
        for _ in 0..5 {
            pool.allocate().unwrap();
        }
        pool.release(ObjectId(2)).unwrap();
        assert!(!pool.is_live(ObjectId(2)));
        assert_eq!(pool.allocate().unwrap(), ObjectId(2));
        assert!(pool.is_live(ObjectId(2)));
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = FreeList::<2>::new();
        let id = pool.allocate().unwrap();
        pool.release(id).unwrap();
        assert_eq!(pool.release(id), Err(PoolError::NotAllocated { id }));
        assert_eq!(
            pool.release(ObjectId(1)),
            Err(PoolError::NotAllocated { id: ObjectId(1) })
        );
        assert_eq!(
            pool.release(ObjectId(2)),
            Err(PoolError::OutOfRange {
                id: ObjectId(2),
                capacity: 2
            })
        );
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn generations_track_liveness() {
        let mut pool = FreeList::<1>::new();
        assert_eq!(pool.generation(ObjectId(0)), Some(0));
        let id = pool.allocate().unwrap();
        assert_eq!(pool.generation(id), Some(1));
        pool.release(id).unwrap();
        pool.allocate().unwrap();
        assert_eq!(pool.generation(id), Some(3));
        pool.reset();
        assert_eq!(pool.generation(id), Some(4));
        assert_eq!(pool.generation(ObjectId(1)), None);
    }

    #[test]
    fn zeroed_image_needs_reset() {
        let mut pool: FreeList<3> = bytemuck::Zeroable::zeroed();
        assert_eq!(pool.allocate(), Err(PoolError::Exhausted { capacity: 3 }));
        assert!(pool.verify().is_err());
        pool.reset();
        pool.verify().unwrap();
        assert_eq!(pool.allocate().unwrap(), ObjectId(0));
    }

    proptest! {
        #[test]
        fn live_set_matches_model(ops in proptest::collection::vec(any::<Option<u8>>(), 1..200)) {
            let mut pool = FreeList::<16>::new();
            let mut live = std::collections::BTreeSet::new();
            for op in ops {
                match op {
                    None => match pool.allocate() {
                        Ok(id) => prop_assert!(live.insert(id.0)),
                        Err(e) => {
                            prop_assert_eq!(e, PoolError::Exhausted { capacity: 16 });
                            prop_assert_eq!(live.len(), 16);
                        }
                    },
                    Some(raw) => {
                        let id = ObjectId(u32::from(raw % 16));
                        let was_live = live.remove(&id.0);
                        prop_assert_eq!(pool.release(id).is_ok(), was_live);
                    }
                }
            }
            let ids: Vec<u32> = pool.iter_live().map(|id| id.0).collect();
            prop_assert_eq!(ids, live.into_iter().collect::<Vec<_>>());
            prop_assert!(pool.verify().is_ok());
        }
    }
}
