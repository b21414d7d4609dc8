//! Identifiers shared by fixtures.

use trackforge_core::{DungeonId, ItemId, SequenceBreakId};

pub const HOOKSHOT: ItemId = ItemId::new(1);
pub const LAMP: ItemId = ItemId::new(2);
pub const BOW: ItemId = ItemId::new(3);
pub const SWORD: ItemId = ItemId::new(4);
pub const CRYSTAL: ItemId = ItemId::new(5);

pub const EASTERN_PALACE: DungeonId = DungeonId::new(1);
pub const DESERT_PALACE: DungeonId = DungeonId::new(2);
pub const SWAMP_PALACE: DungeonId = DungeonId::new(3);
pub const GANONS_TOWER: DungeonId = DungeonId::new(4);

pub const DARK_ROOM: SequenceBreakId = SequenceBreakId::new(1);
pub const BOMB_JUMP: SequenceBreakId = SequenceBreakId::new(2);
