//! Entity categories for filtered spatial queries.
//!
//! Each bit classifies an entity (player, creature, terrain, ...). The bit
//! assignments are a stable contract: debug inspectors and other tooling
//! display category names by decoding these values, so changing a bit is a
//! breaking change.
//!
//! Note that `CategoryMask::contains` (from `bitflags`) is a *superset*
//! test. Query filtering uses the *overlap* test [`contains`] from this
//! module: an entity matches when it shares at least one bit with the mask.

use bitflags::bitflags;

bitflags! {
    /// Bitmask of entity categories.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct CategoryMask: u32 {
        /// The player character
        const PLAYER          = 0x0001;
        /// Wild creatures
        const CREATURES       = 0x0002;
        /// Terrain chunks and static ground geometry
        const TERRAIN         = 0x0004;
        /// Grass and other vegetation
        const VEGETATION      = 0x0008;
        /// Water volumes
        const WATER           = 0x0010;
        /// Pick-up items
        const ITEMS           = 0x0020;
        /// Thrown capture devices
        const CAPTURE_DEVICES = 0x0040;
        /// Trigger zones
        const TRIGGER_ZONES   = 0x0080;
        /// Non-player characters
        const NPCS            = 0x0100;
        /// Buildings and large static structures
        const BUILDINGS       = 0x0200;
        /// Collectibles
        const COLLECTIBLES    = 0x0400;
        /// Particle emitters
        const PARTICLES       = 0x0800;
        /// World-space UI anchors
        const UI              = 0x1000;
        /// Debug helpers
        const DEBUG           = 0x2000;
        /// Cameras
        const CAMERA          = 0x4000;
        /// Ambient environment objects
        const ENVIRONMENT     = 0x8000;
        /// Every category; queries with this mask skip category filtering
        const ALL             = 0xFFFF_FFFF;

        /// Things the player can interact with
        const INTERACTABLES = Self::ITEMS.bits()
            | Self::CAPTURE_DEVICES.bits()
            | Self::NPCS.bits()
            | Self::COLLECTIBLES.bits();
        /// Static world scenery
        const ENVIRONMENT_STATIC = Self::TERRAIN.bits()
            | Self::VEGETATION.bits()
            | Self::WATER.bits()
            | Self::BUILDINGS.bits();
        /// Everything gameplay logic reasons about
        const GAMEPLAY_ENTITIES = Self::PLAYER.bits()
            | Self::CREATURES.bits()
            | Self::INTERACTABLES.bits();
        /// Objects that never move
        const STATIC_OBJECTS = Self::TERRAIN.bits() | Self::BUILDINGS.bits();
        /// Objects that move every few frames
        const DYNAMIC_OBJECTS = Self::PLAYER.bits()
            | Self::CREATURES.bits()
            | Self::ITEMS.bits()
            | Self::CAPTURE_DEVICES.bits();
    }
}

/// No category. Entities without a recorded category behave as if they
/// had this one.
pub const NONE: CategoryMask = CategoryMask::empty();

impl Default for CategoryMask {
    fn default() -> Self {
        NONE
    }
}

/// True when `mask` and `category` share at least one bit.
pub fn contains(mask: CategoryMask, category: CategoryMask) -> bool {
    mask.intersects(category)
}

/// Union of two masks.
pub fn combine(mask: CategoryMask, other: CategoryMask) -> CategoryMask {
    mask | other
}

/// `mask` with every bit of `category` cleared.
pub fn remove(mask: CategoryMask, category: CategoryMask) -> CategoryMask {
    mask.difference(category)
}

/// True for the empty mask.
pub fn is_empty(mask: CategoryMask) -> bool {
    mask.is_empty()
}

/// True only for the full `ALL` mask.
pub fn is_all(mask: CategoryMask) -> bool {
    mask == CategoryMask::ALL
}

const NAMES: &[(CategoryMask, &str)] = &[
    (NONE, "None"),
    (CategoryMask::PLAYER, "Player"),
    (CategoryMask::CREATURES, "Creatures"),
    (CategoryMask::TERRAIN, "Terrain"),
    (CategoryMask::VEGETATION, "Vegetation"),
    (CategoryMask::WATER, "Water"),
    (CategoryMask::ITEMS, "Items"),
    (CategoryMask::CAPTURE_DEVICES, "CaptureDevices"),
    (CategoryMask::TRIGGER_ZONES, "TriggerZones"),
    (CategoryMask::NPCS, "NPCs"),
    (CategoryMask::BUILDINGS, "Buildings"),
    (CategoryMask::COLLECTIBLES, "Collectibles"),
    (CategoryMask::PARTICLES, "Particles"),
    (CategoryMask::UI, "UI"),
    (CategoryMask::DEBUG, "Debug"),
    (CategoryMask::CAMERA, "Camera"),
    (CategoryMask::ENVIRONMENT, "Environment"),
    (CategoryMask::ALL, "All"),
    (CategoryMask::INTERACTABLES, "Interactables"),
    (CategoryMask::ENVIRONMENT_STATIC, "EnvironmentStatic"),
    (CategoryMask::GAMEPLAY_ENTITIES, "GameplayEntities"),
    (CategoryMask::STATIC_OBJECTS, "StaticObjects"),
    (CategoryMask::DYNAMIC_OBJECTS, "DynamicObjects"),
];

/// Human-readable name for a single category or a named union.
///
/// Arbitrary combinations that are not one of the named unions render as
/// `"Unknown"`.
pub fn display_name(category: CategoryMask) -> &'static str {
    NAMES
        .iter()
        .find(|(mask, _)| *mask == category)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

#[cfg(test)]
#[path = "category_tests.rs"]
mod tests;
