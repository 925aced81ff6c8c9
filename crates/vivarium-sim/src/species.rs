//! Tagged per-species creature data.
//!
//! Each creature stores a [`SpeciesRecord`]: a discriminator plus three
//! words of payload. The payload is only ever read through
//! [`SpeciesRecord::decode`], which picks the interpretation from the tag.

use bytemuck::{Pod, Zeroable};
use vivarium_core::{ObjectId, NIL};

use crate::error::SimError;

/// Species discriminator as stored on disk.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpeciesTag {
    /// Forager that lays pheromone while carrying food.
    Ant = 1,
    /// Hunter that tracks a single target.
    Predator = 2,
    /// Stationary spore producer.
    Fungus = 3,
}

impl SpeciesTag {
    /// Inverse of `tag as u32`.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Ant),
            2 => Some(Self::Predator),
            3 => Some(Self::Fungus),
            _ => None,
        }
    }
}

/// Decoded species state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Species {
    /// An ant.
    Ant {
        /// Whether it is carrying food (and so lays pheromone).
        carrying: bool,
        /// Heading in radians.
        heading: f32,
    },
    /// A predator.
    Predator {
        /// Creature being chased, if any.
        target: Option<ObjectId>,
        /// Hunger in `[0, 1]`.
        hunger: f32,
    },
    /// A fungus.
    Fungus {
        /// Ticks until the next spore release.
        spore_timer: u32,
        /// Stored energy.
        energy: f32,
    },
}

impl Species {
    /// The discriminator for this variant.
    pub fn tag(&self) -> SpeciesTag {
        match self {
            Self::Ant { .. } => SpeciesTag::Ant,
            Self::Predator { .. } => SpeciesTag::Predator,
            Self::Fungus { .. } => SpeciesTag::Fungus,
        }
    }

    /// The on-disk form.
    pub fn encode(&self) -> SpeciesRecord {
        let payload = match *self {
            Self::Ant { carrying, heading } => [u32::from(carrying), heading.to_bits(), 0],
            Self::Predator { target, hunger } => {
                [target.map_or(NIL, |id| id.0), hunger.to_bits(), 0]
            }
            Self::Fungus {
                spore_timer,
                energy,
            } => [spore_timer, energy.to_bits(), 0],
        };
        SpeciesRecord {
            tag: self.tag() as u32,
            payload,
        }
    }
}

/// Persisted species discriminator and payload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SpeciesRecord {
    /// Raw [`SpeciesTag`]; zero for a vacant slot.
    pub tag: u32,
    /// Interpretation depends on `tag`.
    pub payload: [u32; 3],
}

impl SpeciesRecord {
    /// Interpret the payload according to the tag.
    pub fn decode(&self) -> Result<Species, SimError> {
        let [a, b, _] = self.payload;
        match SpeciesTag::from_raw(self.tag) {
            Some(SpeciesTag::Ant) => Ok(Species::Ant {
                carrying: a != 0,
                heading: f32::from_bits(b),
            }),
            Some(SpeciesTag::Predator) => Ok(Species::Predator {
                target: (a != NIL).then_some(ObjectId(a)),
                hunger: f32::from_bits(b),
            }),
            Some(SpeciesTag::Fungus) => Ok(Species::Fungus {
                spore_timer: a,
                energy: f32::from_bits(b),
            }),
            None => Err(SimError::UnknownSpecies { tag: self.tag }),
        }
    }
}
