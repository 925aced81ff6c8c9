//! Backing storage for voxel chains.
//!
//! The grid's mutable state is three arrays: a [`GridFrame`] header, one
//! [`Object`] record per entity slot, and one chain head per voxel. Records
//! link to each other by index ([`NIL`] terminates a chain), so the bytes
//! of a [`FixedVoxelStore`] are a valid image on their own and can be
//! persisted or mapped from a file unchanged.

use bytemuck::{Pod, Zeroable};
use vivarium_core::{VoxelHash, NIL};

/// Per-entity record: position plus intrusive chain links.
///
/// `hash` is [`VoxelHash::UNASSIGNED`]'s raw value while the entity is not
/// indexed; otherwise it names the voxel whose chain holds the record.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Object {
    /// World position, padded to three axes.
    pub position: [f32; 3],
    /// Slot id; equals the record's index once the store is reset.
    pub id: u32,
    /// Next record in the voxel chain, or `NIL`.
    pub next: u32,
    /// Previous record in the voxel chain, or `NIL`.
    pub prev: u32,
    /// Raw voxel hash the record is linked under.
    pub hash: u32,
}

impl Object {
    /// An unlinked record for slot `id`.
    pub const fn detached(id: u32) -> Self {
        Self {
            position: [0.0; 3],
            id,
            next: NIL,
            prev: NIL,
            hash: NIL,
        }
    }

    /// The voxel this record currently belongs to.
    #[inline]
    pub fn voxel(&self) -> VoxelHash {
        VoxelHash(self.hash)
    }

    /// Whether the record is linked into a chain.
    #[inline]
    pub fn is_linked(&self) -> bool {
        self.hash != NIL
    }
}

/// Persisted grid header.
///
/// Holds enough to re-derive the world ↔ voxel transform after a restart.
/// A zeroed frame (`ready == 0`) means the grid has never been reset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GridFrame {
    /// Lower world bound, padded to three axes.
    pub min: [f32; 3],
    /// Upper world bound, padded to three axes.
    pub max: [f32; 3],
    /// Voxels per axis.
    pub resolution: u32,
    /// Non-zero once `reset` has run.
    pub ready: u32,
    /// Number of linked records.
    pub active: u32,
    /// [`EdgeBehavior::code`](crate::EdgeBehavior::code) of the grid.
    pub edge: u32,
}

/// Split mutable view over a store's arrays.
pub struct StoreParts<'a> {
    /// Grid header.
    pub frame: &'a mut GridFrame,
    /// Entity records.
    pub objects: &'a mut [Object],
    /// Voxel chain heads.
    pub heads: &'a mut [u32],
}

/// Read access to voxel chain storage.
pub trait VoxelStore {
    /// Grid header.
    fn frame(&self) -> &GridFrame;
    /// Entity records, indexed by slot id.
    fn objects(&self) -> &[Object];
    /// Chain heads, indexed by voxel hash.
    fn heads(&self) -> &[u32];
}

/// Mutable access to voxel chain storage.
pub trait VoxelStoreMut: VoxelStore {
    /// Borrow header, records and heads at once.
    fn parts_mut(&mut self) -> StoreParts<'_>;
}

impl<S: VoxelStore + ?Sized> VoxelStore for &S {
    fn frame(&self) -> &GridFrame {
        (**self).frame()
    }
    fn objects(&self) -> &[Object] {
        (**self).objects()
    }
    fn heads(&self) -> &[u32] {
        (**self).heads()
    }
}

impl<S: VoxelStore + ?Sized> VoxelStore for &mut S {
    fn frame(&self) -> &GridFrame {
        (**self).frame()
    }
    fn objects(&self) -> &[Object] {
        (**self).objects()
    }
    fn heads(&self) -> &[u32] {
        (**self).heads()
    }
}

impl<S: VoxelStoreMut + ?Sized> VoxelStoreMut for &mut S {
    fn parts_mut(&mut self) -> StoreParts<'_> {
        (**self).parts_mut()
    }
}

/// Heap-backed store, allocated once at construction.
#[derive(Clone, Debug)]
pub struct HeapVoxelStore {
    frame: GridFrame,
    objects: Vec<Object>,
    heads: Vec<u32>,
}

impl HeapVoxelStore {
    /// Allocate storage for `capacity` entities over `voxel_count` voxels.
    pub fn new(capacity: usize, voxel_count: usize) -> Self {
        Self {
            frame: GridFrame::default(),
            objects: (0..capacity as u32).map(Object::detached).collect(),
            heads: vec![NIL; voxel_count],
        }
    }
}

impl VoxelStore for HeapVoxelStore {
    fn frame(&self) -> &GridFrame {
        &self.frame
    }
    fn objects(&self) -> &[Object] {
        &self.objects
    }
    fn heads(&self) -> &[u32] {
        &self.heads
    }
}

impl VoxelStoreMut for HeapVoxelStore {
    fn parts_mut(&mut self) -> StoreParts<'_> {
        StoreParts {
            frame: &mut self.frame,
            objects: &mut self.objects,
            heads: &mut self.heads,
        }
    }
}

/// Inline, plain-old-data store for `OBJECTS` entities over `VOXELS`
/// voxels.
///
/// Meant to be embedded in a `#[repr(C)]` aggregate that is mapped from a
/// file. Construct it zeroed (for example with `bytemuck::zeroed_box`) and
/// let `Hashspace::reset` format it; a zeroed store reports itself as not
/// reset.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FixedVoxelStore<const OBJECTS: usize, const VOXELS: usize> {
    frame: GridFrame,
    objects: [Object; OBJECTS],
    heads: [u32; VOXELS],
}

impl<const OBJECTS: usize, const VOXELS: usize> FixedVoxelStore<OBJECTS, VOXELS> {
    /// Entity capacity.
    pub const CAPACITY: usize = OBJECTS;

    /// Number of voxels.
    pub const VOXELS: usize = VOXELS;
}

impl<const OBJECTS: usize, const VOXELS: usize> std::fmt::Debug
    for FixedVoxelStore<OBJECTS, VOXELS>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedVoxelStore")
            .field("frame", &self.frame)
            .field("objects", &OBJECTS)
            .field("voxels", &VOXELS)
            .finish()
    }
}

impl<const OBJECTS: usize, const VOXELS: usize> VoxelStore for FixedVoxelStore<OBJECTS, VOXELS> {
    fn frame(&self) -> &GridFrame {
        &self.frame
    }
    fn objects(&self) -> &[Object] {
        &self.objects
    }
    fn heads(&self) -> &[u32] {
        &self.heads
    }
}

impl<const OBJECTS: usize, const VOXELS: usize> VoxelStoreMut
    for FixedVoxelStore<OBJECTS, VOXELS>
{
    fn parts_mut(&mut self) -> StoreParts<'_> {
        StoreParts {
            frame: &mut self.frame,
            objects: &mut self.objects,
            heads: &mut self.heads,
        }
    }
}
