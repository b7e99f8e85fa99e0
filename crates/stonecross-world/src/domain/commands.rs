//! Commands for the world state context.

use stonecross_core::command::UpdateDocument;

use super::map_unlocks::MapUnlocks;
use super::npcs::NpcDirectory;
use super::pantheon::Pantheon;

/// Replace or toggle a room's map unlocks.
pub type UpdateMapUnlocks = UpdateDocument<MapUnlocks>;

/// Replace, upsert into, or delete from a room's NPC directory.
pub type UpdateNpcDirectory = UpdateDocument<NpcDirectory>;

/// Replace a room's pantheon.
pub type UpdatePantheon = UpdateDocument<Pantheon>;
