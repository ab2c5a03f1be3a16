//! Static classification of thing type codes.
//!
//! One flat, auditable table maps every known type code to its canonical
//! name and group. The group also fixes the render size a map view uses
//! for the thing marker; keeping that per group rather than per entry
//! matches how consumers actually draw them.

/// Broad classification of a thing, used for filtering and marker colour
/// and size selection by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThingGroup {
    Monster,
    Weapon,
    Ammo,
    Artifact,
    Powerup,
    Key,
    Obstacle,
    Decoration,
    Other,
    Unknown,
}

impl ThingGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThingGroup::Monster => "monster",
            ThingGroup::Weapon => "weapon",
            ThingGroup::Ammo => "ammo",
            ThingGroup::Artifact => "artifact",
            ThingGroup::Powerup => "powerup",
            ThingGroup::Key => "key",
            ThingGroup::Obstacle => "obstacle",
            ThingGroup::Decoration => "decoration",
            ThingGroup::Other => "other",
            ThingGroup::Unknown => "unknown",
        }
    }

    /// Marker size in map units for drawing this group of thing
    pub fn render_size(&self) -> u16 {
        match self {
            ThingGroup::Monster => 16,
            ThingGroup::Weapon => 12,
            ThingGroup::Ammo => 10,
            ThingGroup::Artifact => 10,
            ThingGroup::Powerup => 12,
            ThingGroup::Key => 10,
            ThingGroup::Obstacle => 12,
            ThingGroup::Decoration => 8,
            ThingGroup::Other => 10,
            ThingGroup::Unknown => 8,
        }
    }
}

/// One row of the static type table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThingInfo {
    pub kind: i16,
    pub name: &'static str,
    pub group: ThingGroup,
}

const fn info(kind: i16, name: &'static str, group: ThingGroup) -> ThingInfo {
    ThingInfo { kind, name, group }
}

use ThingGroup::*;

/// Every known type code with its canonical name and group, in code
/// order within each group.
pub static THING_INFO: &[ThingInfo] = &[
    // Spawn points and markers
    info(1, "PLAYER_1_START", Other),
    info(2, "PLAYER_2_START", Other),
    info(3, "PLAYER_3_START", Other),
    info(4, "PLAYER_4_START", Other),
    info(11, "DEATHMATCH_START", Other),
    info(14, "TELEPORT_DESTINATION", Other),
    info(87, "MONSTER_SPAWN_SPOT", Other),
    info(89, "MONSTER_SPAWNER", Other),
    // Monsters
    info(7, "SPIDERDEMON", Monster),
    info(9, "SHOTGUN_GUY", Monster),
    info(16, "CYBERDEMON", Monster),
    info(58, "SPECTRE", Monster),
    info(64, "ARCHVILE", Monster),
    info(65, "HEAVY_WEAPON_DUDE", Monster),
    info(66, "REVENANT", Monster),
    info(67, "MANCUBUS", Monster),
    info(68, "ARACHNOTRON", Monster),
    info(69, "HELL_KNIGHT", Monster),
    info(71, "PAIN_ELEMENTAL", Monster),
    info(72, "COMMANDER_KEEN", Monster),
    info(84, "WOLFENSTEIN_SS", Monster),
    info(88, "BOSS_BRAIN", Monster),
    info(3001, "IMP", Monster),
    info(3002, "DEMON", Monster),
    info(3003, "BARON_OF_HELL", Monster),
    info(3004, "ZOMBIEMAN", Monster),
    info(3005, "CACODEMON", Monster),
    info(3006, "LOST_SOUL", Monster),
    // Weapons
    info(82, "SUPER_SHOTGUN", Weapon),
    info(2001, "SHOTGUN", Weapon),
    info(2002, "CHAINGUN", Weapon),
    info(2003, "ROCKET_LAUNCHER", Weapon),
    info(2004, "PLASMA_GUN", Weapon),
    info(2005, "CHAINSAW", Weapon),
    info(2006, "BFG_9000", Weapon),
    // Ammo
    info(17, "ENERGY_CELL_PACK", Ammo),
    info(2007, "CLIP", Ammo),
    info(2008, "SHOTGUN_SHELLS", Ammo),
    info(2010, "ROCKET", Ammo),
    info(2046, "BOX_OF_ROCKETS", Ammo),
    info(2047, "ENERGY_CELL", Ammo),
    info(2048, "BOX_OF_BULLETS", Ammo),
    info(2049, "BOX_OF_SHELLS", Ammo),
    // Artifacts
    info(83, "MEGASPHERE", Artifact),
    info(2013, "SUPERCHARGE", Artifact),
    info(2014, "HEALTH_BONUS", Artifact),
    info(2015, "ARMOR_BONUS", Artifact),
    info(2022, "INVULNERABILITY", Artifact),
    info(2023, "BERSERK", Artifact),
    info(2024, "PARTIAL_INVISIBILITY", Artifact),
    info(2026, "COMPUTER_AREA_MAP", Artifact),
    info(2045, "LIGHT_VISOR", Artifact),
    // Powerups
    info(8, "BACKPACK", Powerup),
    info(2011, "STIMPACK", Powerup),
    info(2012, "MEDIKIT", Powerup),
    info(2018, "ARMOR", Powerup),
    info(2019, "MEGAARMOR", Powerup),
    info(2025, "RADIATION_SUIT", Powerup),
    // Keys
    info(5, "BLUE_KEY_CARD", Key),
    info(6, "YELLOW_KEY_CARD", Key),
    info(13, "RED_KEY_CARD", Key),
    info(38, "RED_KEY_SKULL", Key),
    info(39, "YELLOW_KEY_SKULL", Key),
    info(40, "BLUE_KEY_SKULL", Key),
    // Obstacles (block movement)
    info(25, "IMPALED_HUMAN", Obstacle),
    info(26, "TWITCHING_IMPALED_HUMAN", Obstacle),
    info(27, "SKULL_ON_A_POLE", Obstacle),
    info(28, "FIVE_SKULLS_SHISH_KEBAB", Obstacle),
    info(29, "PILE_OF_SKULLS_AND_CANDLES", Obstacle),
    info(30, "TALL_GREEN_PILLAR", Obstacle),
    info(31, "SHORT_GREEN_PILLAR", Obstacle),
    info(32, "TALL_RED_PILLAR", Obstacle),
    info(33, "SHORT_RED_PILLAR", Obstacle),
    info(35, "CANDELABRA", Obstacle),
    info(36, "SHORT_GREEN_PILLAR_WITH_HEART", Obstacle),
    info(37, "SHORT_RED_PILLAR_WITH_SKULL", Obstacle),
    info(41, "EVIL_EYE", Obstacle),
    info(42, "FLOATING_SKULL", Obstacle),
    info(43, "BURNT_TREE", Obstacle),
    info(44, "TALL_BLUE_FIRESTICK", Obstacle),
    info(45, "TALL_GREEN_FIRESTICK", Obstacle),
    info(46, "TALL_RED_FIRESTICK", Obstacle),
    info(47, "BROWN_STUMP", Obstacle),
    info(48, "TALL_TECHNO_COLUMN", Obstacle),
    info(49, "HANGING_VICTIM_TWITCHING_BLOCKING", Obstacle),
    info(50, "HANGING_VICTIM_ARMS_OUT_BLOCKING", Obstacle),
    info(51, "HANGING_VICTIM_ONE_LEGGED_BLOCKING", Obstacle),
    info(52, "HANGING_PAIR_OF_LEGS_BLOCKING", Obstacle),
    info(53, "HANGING_LEG_BLOCKING", Obstacle),
    info(54, "BROWN_TREE", Obstacle),
    info(55, "SHORT_BLUE_FIRESTICK", Obstacle),
    info(56, "SHORT_GREEN_FIRESTICK", Obstacle),
    info(57, "SHORT_RED_FIRESTICK", Obstacle),
    info(70, "BURNING_BARREL", Obstacle),
    info(73, "HANGING_VICTIM_GUTS_REMOVED", Obstacle),
    info(74, "HANGING_VICTIM_GUTS_AND_BRAIN_REMOVED", Obstacle),
    info(75, "HANGING_TORSO_LOOKING_DOWN", Obstacle),
    info(76, "HANGING_TORSO_OPEN_SKULL", Obstacle),
    info(77, "HANGING_TORSO_LOOKING_UP", Obstacle),
    info(78, "HANGING_TORSO_BRAIN_REMOVED", Obstacle),
    info(85, "TALL_TECHNO_FLOOR_LAMP", Obstacle),
    info(86, "SHORT_TECHNO_FLOOR_LAMP", Obstacle),
    info(2028, "FLOOR_LAMP", Obstacle),
    info(2035, "EXPLODING_BARREL", Obstacle),
    // Decorations (no collision)
    info(10, "BLOODY_MESS", Decoration),
    info(12, "BLOODY_MESS_2", Decoration),
    info(15, "DEAD_PLAYER", Decoration),
    info(18, "DEAD_FORMER_HUMAN", Decoration),
    info(19, "DEAD_FORMER_SERGEANT", Decoration),
    info(20, "DEAD_IMP", Decoration),
    info(21, "DEAD_DEMON", Decoration),
    info(22, "DEAD_CACODEMON", Decoration),
    info(23, "DEAD_LOST_SOUL", Decoration),
    info(24, "POOL_OF_BLOOD_AND_FLESH", Decoration),
    info(34, "CANDLE", Decoration),
    info(59, "HANGING_VICTIM_ARMS_OUT", Decoration),
    info(60, "HANGING_PAIR_OF_LEGS", Decoration),
    info(61, "HANGING_VICTIM_ONE_LEGGED", Decoration),
    info(62, "HANGING_LEG", Decoration),
    info(63, "HANGING_VICTIM_TWITCHING", Decoration),
    info(79, "POOL_OF_BLOOD", Decoration),
    info(80, "POOL_OF_BLOOD_2", Decoration),
    info(81, "POOL_OF_BRAINS", Decoration),
];

/// Find the table row for a raw type code
pub fn lookup(kind: i16) -> Option<&'static ThingInfo> {
    THING_INFO.iter().find(|i| i.kind == kind)
}

/// Canonical name for a type code, `"UNKNOWN"` when unmapped
pub fn name_of(kind: i16) -> &'static str {
    lookup(kind).map_or("UNKNOWN", |i| i.name)
}

/// Group for a type code, `Unknown` when unmapped
pub fn group_of(kind: i16) -> ThingGroup {
    lookup(kind).map_or(ThingGroup::Unknown, |i| i.group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_start_is_other() {
        let i = lookup(1).unwrap();
        assert_eq!(i.name, "PLAYER_1_START");
        assert_eq!(i.group, ThingGroup::Other);
    }

    #[test]
    fn known_groups() {
        assert_eq!(group_of(3001), ThingGroup::Monster);
        assert_eq!(group_of(2001), ThingGroup::Weapon);
        assert_eq!(group_of(2007), ThingGroup::Ammo);
        assert_eq!(group_of(2013), ThingGroup::Artifact);
        assert_eq!(group_of(2012), ThingGroup::Powerup);
        assert_eq!(group_of(5), ThingGroup::Key);
        assert_eq!(group_of(2035), ThingGroup::Obstacle);
        assert_eq!(group_of(34), ThingGroup::Decoration);
    }

    #[test]
    fn unmapped_code_is_unknown() {
        assert_eq!(group_of(12345), ThingGroup::Unknown);
        assert_eq!(name_of(12345), "UNKNOWN");
        assert!(lookup(12345).is_none());
    }

    #[test]
    fn no_duplicate_codes() {
        for (n, a) in THING_INFO.iter().enumerate() {
            for b in &THING_INFO[n + 1..] {
                assert_ne!(a.kind, b.kind, "{} and {} share a code", a.name, b.name);
            }
        }
    }

    #[test]
    fn render_sizes_are_fixed_per_group() {
        assert_eq!(ThingGroup::Monster.render_size(), 16);
        assert_eq!(ThingGroup::Decoration.render_size(), 8);
        assert_eq!(ThingGroup::Unknown.render_size(), 8);
    }
}
