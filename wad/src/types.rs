//! Record structures for every lump kind, in WAD order.
//!
//! Everything here is an immutable value record produced once per source
//! buffer by the decoders in `wad`, `iterators`, `map` and `textures`.
//! Nothing is mutated after construction.

use std::collections::HashMap;

/// Will be either `IWAD` for a game file, or `PWAD` for a patch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WadType {
    IWad,
    PWad,
}

impl WadType {
    pub fn from_magic(magic: &[u8; 4]) -> Option<Self> {
        match magic {
            b"IWAD" => Some(WadType::IWad),
            b"PWAD" => Some(WadType::PWad),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WadType::IWad => "IWAD",
            WadType::PWad => "PWAD",
        }
    }
}

/// Header which tells us the WAD type and where the data is
///
/// The header structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                             |
/// |------------|--------------|-----------------------------------------------------|
/// | 0x00-0x03  | 4 ASCII char | *Must* be an ASCII string (either "IWAD" or "PWAD") |
/// | 0x04-0x07  | unsigned int | The number of entries in the directory              |
/// | 0x08-0x0b  | unsigned int | Offset in bytes to the directory in the WAD file    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadHeader {
    pub wad_type: WadType,
    /// The count of lump entries in the directory
    pub dir_count: u32,
    /// Offset in bytes that the directory starts at
    pub dir_offset: u32,
}

/// Contains the details for a lump of data: where it starts, the size of
/// it, and the name
///
/// The directory structure in the WAD is as follows:
///
/// | Field Size | Data Type    | Content                                                    |
/// |------------|--------------|------------------------------------------------------------|
/// | 0x00-0x03  | unsigned int | Offset value to the start of the lump data in the WAD file |
/// | 0x04-0x07  | unsigned int | The size of the lump in bytes                              |
/// | 0x08-0x0f  | 8 ASCII char | ASCII holding the name of the lump                         |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadDirEntry {
    /// The offset in bytes where the lump data starts
    pub lump_offset: u32,
    /// The size in bytes of the lump referenced
    pub lump_size: u32,
    /// Name for the lump data, NUL padding already stripped
    pub lump_name: String,
}

impl WadDirEntry {
    pub fn new(lump_offset: u32, lump_size: u32, lump_name: String) -> Self {
        WadDirEntry {
            lump_offset,
            lump_size,
            lump_name,
        }
    }
}

/// A `WadVertex` is the basic 2D map coordinate
///
/// | Field Size | Data Type | Content      |
/// |------------|-----------|--------------|
/// |  0x00-0x01 |    i16    | X Coordinate |
/// |  0x02-0x03 |    i16    | Y Coordinate |
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WadVertex {
    pub x: i16,
    pub y: i16,
}

impl WadVertex {
    pub fn new(x: i16, y: i16) -> Self {
        WadVertex { x, y }
    }
}

/// Spawn flags on a `WadThing`, a closed enumeration tested bit by bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThingFlag {
    /// Present on skills 1 and 2
    SkillEasy = 0x0001,
    /// Present on skill 3
    SkillMedium = 0x0002,
    /// Present on skills 4 and 5
    SkillHard = 0x0004,
    /// Waits in ambush, only reacts on sight
    Ambush = 0x0008,
    /// Only spawned in multiplayer games
    MultiplayerOnly = 0x0010,
}

impl ThingFlag {
    const ALL: [ThingFlag; 5] = [
        ThingFlag::SkillEasy,
        ThingFlag::SkillMedium,
        ThingFlag::SkillHard,
        ThingFlag::Ambush,
        ThingFlag::MultiplayerOnly,
    ];

    pub fn extract(flags: i16) -> Vec<ThingFlag> {
        Self::ALL
            .iter()
            .copied()
            .filter(|f| flags as u16 & *f as u16 != 0)
            .collect()
    }
}

/// A `Thing` describes only the position, type, and angle + spawn flags
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content    |
/// |------------|-----------|------------|
/// |  0x00-0x01 |    i16    | X Position |
/// |  0x02-0x03 |    i16    | Y Position |
/// |  0x04-0x05 |    i16    | Angle      |
/// |  0x06-0x07 |    i16    | Type       |
/// |  0x08-0x09 |    i16    | Flags      |
///
/// Each `Thing` record is 10 bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WadThing {
    pub x: i16,
    pub y: i16,
    /// Facing angle in degrees
    pub angle: i16,
    /// Raw type code, resolved against the static table in `things`
    pub kind: i16,
    pub flags: i16,
}

impl WadThing {
    pub fn new(x: i16, y: i16, angle: i16, kind: i16, flags: i16) -> Self {
        WadThing {
            x,
            y,
            angle,
            kind,
            flags,
        }
    }

    pub fn flag_names(&self) -> Vec<ThingFlag> {
        ThingFlag::extract(self.flags)
    }
}

/// Attributes of a `WadLineDef`, a closed enumeration tested bit by bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDefFlag {
    /// Blocks players and monsters
    Blocking = 0x0001,
    BlockMonsters = 0x0002,
    TwoSided = 0x0004,
    /// Upper texture is anchored unpegged
    DontPegTop = 0x0008,
    /// Lower texture is anchored unpegged
    DontPegBottom = 0x0010,
    /// Shown as one-sided on the automap
    Secret = 0x0020,
    BlockSound = 0x0040,
    /// Never shown on the automap
    DontDraw = 0x0080,
    /// Always shown on the automap
    AlwaysDraw = 0x0100,
}

impl LineDefFlag {
    const ALL: [LineDefFlag; 9] = [
        LineDefFlag::Blocking,
        LineDefFlag::BlockMonsters,
        LineDefFlag::TwoSided,
        LineDefFlag::DontPegTop,
        LineDefFlag::DontPegBottom,
        LineDefFlag::Secret,
        LineDefFlag::BlockSound,
        LineDefFlag::DontDraw,
        LineDefFlag::AlwaysDraw,
    ];

    pub fn extract(flags: u16) -> Vec<LineDefFlag> {
        Self::ALL
            .iter()
            .copied()
            .filter(|f| flags & *f as u16 != 0)
            .collect()
    }
}

/// Each linedef represents a line from one of the VERTEXES to another.
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type      | Content                                  |
/// |------------|----------------|------------------------------------------|
/// |  0x00-0x01 | Unsigned short | Start vertex                             |
/// |  0x02-0x03 | Unsigned short | End vertex                               |
/// |  0x04-0x05 | Unsigned short | Flags, see `LineDefFlag`                 |
/// |  0x06-0x07 | Unsigned short | Line type / Action                       |
/// |  0x08-0x09 | Unsigned short | Sector tag                               |
/// |  0x0A-0x0B | Unsigned short | Front sidedef                            |
/// |  0x0C-0x0D | Unsigned short | Back sidedef ( 0xFFFF side not present ) |
///
/// Each linedef's record is 14 bytes, made up of 7 16-bit fields. A
/// linedef always has at least one side; the first is the front (right).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadLineDef {
    /// The line starts from this point
    pub start_vertex: u16,
    /// The line ends at this point
    pub end_vertex: u16,
    /// The line attributes, see `LineDefFlag`
    pub flags: u16,
    pub special: i16,
    /// Ties this line's effect type to all SECTORS that have the same tag
    /// number in their last field
    pub sector_tag: i16,
    /// Index to the front (right) `WadSideDef` for this line
    pub front_sidedef: u16,
    /// Index to the back (left) `WadSideDef`. The canonical "no back side"
    /// sentinel is `0xFFFF`, surfaced here as `None`.
    pub back_sidedef: Option<u16>,
}

impl WadLineDef {
    pub fn new(
        start_vertex: u16,
        end_vertex: u16,
        flags: u16,
        special: i16,
        sector_tag: i16,
        front_sidedef: u16,
        back_sidedef: Option<u16>,
    ) -> Self {
        WadLineDef {
            start_vertex,
            end_vertex,
            flags,
            special,
            sector_tag,
            front_sidedef,
            back_sidedef,
        }
    }

    pub fn flag_names(&self) -> Vec<LineDefFlag> {
        LineDefFlag::extract(self.flags)
    }

    /// Two-sidedness is a property of the `TwoSided` flag bit, not of
    /// the back-sidedef field; editors produce lines with the flag set
    /// and no back side, and the reverse.
    pub fn is_two_sided(&self) -> bool {
        self.flags & LineDefFlag::TwoSided as u16 != 0
    }
}

/// A sidedef is a definition of what wall texture(s) to draw along a
/// `WadLineDef`, and a group of sidedefs outline the space of a sector
///
/// Each `WadSideDef` record is 30 bytes:
///
/// | Field Size | Data Type | Content                       |
/// |------------|-----------|-------------------------------|
/// |  0x00-0x01 |    i16    | X offset into texture         |
/// |  0x02-0x03 |    i16    | Y offset into texture         |
/// |  0x04-0x0B |  8 chars  | Upper texture name            |
/// |  0x0C-0x13 |  8 chars  | Lower texture name            |
/// |  0x14-0x1B |  8 chars  | Middle texture name           |
/// |  0x1C-0x1D |    u16    | Sector this sidedef faces     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadSideDef {
    pub x_offset: i16,
    pub y_offset: i16,
    /// Name of upper texture, used for example in the upper of a window
    pub upper_tex: String,
    /// Name of lower texture, used for example in the front of a step
    pub lower_tex: String,
    /// The regular part of a wall
    pub middle_tex: String,
    /// Sector that this sidedef faces or helps to surround
    pub sector: u16,
}

/// The Segments (SEGS) are in a sequential order determined by the
/// SSECTORS lump, which is part of the NODES recursive tree
///
/// | Field Size | Data Type | Content                                    |
/// |------------|-----------|--------------------------------------------|
/// |  0x00-0x01 |    u16    | Index to the vertex the line starts from   |
/// |  0x02-0x03 |    u16    | Index to the vertex the line ends with     |
/// |  0x04-0x05 |    i16    | Angle in Binary Angle Measurement (BAMS)   |
/// |  0x06-0x07 |    u16    | Index to the linedef this seg runs along   |
/// |  0x08-0x09 |    i16    | Direction: 0 front/right, 1 back/left      |
/// |  0x0A-0x0B |    i16    | Offset along the linedef to this seg start |
///
/// Each `WadSegment` record is 12 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSegment {
    pub start_vertex: u16,
    pub end_vertex: u16,
    /// Binary Angle Measurement; degrees(0-360) = angle * 0.005493164
    pub angle: i16,
    /// The linedef this segment travels along
    pub linedef: u16,
    /// The side: 0 = front/right, 1 = back/left
    pub direction: i16,
    /// Offset distance along the linedef (from `start_vertex`) to the
    /// start of this segment
    pub offset: i16,
}

/// A `WadSubSector` is a convex run of segments, referenced from the leaf
/// ends of the NODES tree
///
/// | Field Size | Data Type | Content                             |
/// |------------|-----------|-------------------------------------|
/// |  0x00-0x01 |    u16    | How many segments line this ssector |
/// |  0x02-0x03 |    u16    | Index to the starting segment       |
///
/// Each `WadSubSector` record is 4 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadSubSector {
    /// How many `WadSegment`s line this subsector
    pub seg_count: u16,
    /// The `WadSegment` to start with
    pub start_seg: u16,
}

/// Sector special type marking the sector as a secret for end-of-level
/// tallies.
pub const SECTOR_SPECIAL_SECRET: i16 = 9;

/// A `WadSector` is a horizontal area of the map with a floor height and a
/// ceiling height. Any change in floor/ceiling height or texture requires
/// a new sector (and therefore separating linedefs and sidedefs).
///
/// Each `WadSector` record is 26 bytes:
///
/// | Field Size | Data Type | Content              |
/// |------------|-----------|----------------------|
/// |  0x00-0x01 |    i16    | Floor height         |
/// |  0x02-0x03 |    i16    | Ceiling height       |
/// |  0x04-0x0B |  8 chars  | Floor texture name   |
/// |  0x0C-0x13 |  8 chars  | Ceiling texture name |
/// |  0x14-0x15 |    i16    | Light level          |
/// |  0x16-0x17 |    i16    | Special type         |
/// |  0x18-0x19 |    i16    | Sector tag           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadSector {
    pub floor_height: i16,
    pub ceil_height: i16,
    /// Floor texture name
    pub floor_tex: String,
    /// Ceiling texture name
    pub ceil_tex: String,
    /// Light level from 0-255. There are actually only 32 brightnesses
    /// possible so blocks of 8 are the same bright
    pub light_level: i16,
    /// This determines some area-effects called special sectors
    pub kind: i16,
    /// A "tag" number matched against LINEDEFs carrying the same tag
    pub tag: i16,
}

impl WadSector {
    pub fn is_secret(&self) -> bool {
        self.kind == SECTOR_SPECIAL_SECRET
    }
}

/// Sector-to-sector visibility exclusion matrix recovered from the packed
/// bit table in the REJECT lump.
///
/// `true` at `[i][j]` means sector `j` is not visible/audible from sector
/// `i`. Symmetric in practice but not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadRejectTable {
    table: Vec<Vec<bool>>,
}

impl WadRejectTable {
    pub fn new(table: Vec<Vec<bool>>) -> Self {
        WadRejectTable { table }
    }

    /// Side length of the square matrix (the sector count)
    pub fn sector_count(&self) -> usize {
        self.table.len()
    }

    pub fn is_rejected(&self, from: usize, to: usize) -> bool {
        self.table[from][to]
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.table
    }
}

/// The BLOCKMAP is a pre-calculated uniform grid over the map bounds,
/// each cell listing the linedefs overlapping it, used to speed up
/// collision detection.
///
/// The 8-byte lump header:
///
/// | Field Size | Data Type | Content            |
/// |------------|-----------|--------------------|
/// |  0x00-0x01 |    i16    | Grid origin X      |
/// |  0x02-0x03 |    i16    | Grid origin Y      |
/// |  0x04-0x05 |    u16    | Number of columns  |
/// |  0x06-0x07 |    u16    | Number of rows     |
///
/// The full per-cell line lists are O(map area) and only decoded when
/// explicitly requested; `cell_lines` is `None` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadBlockMap {
    /// Leftmost X coord
    pub x_origin: i16,
    /// Bottommost Y coord
    pub y_origin: i16,
    pub columns: u16,
    pub rows: u16,
    /// Row-major cell lists of linedef indices, with the conventional
    /// leading `0` and trailing `0xFFFF` markers already stripped
    pub cell_lines: Option<Vec<Vec<u16>>>,
}

impl WadBlockMap {
    pub fn cell(&self, column: u16, row: u16) -> Option<&[u16]> {
        let lists = self.cell_lines.as_ref()?;
        lists
            .get(row as usize * self.columns as usize + column as usize)
            .map(|v| v.as_slice())
    }
}

/// A single colour from a palette, with the `#rrggbb` form precomputed at
/// decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadColour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
}

impl WadColour {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        WadColour {
            r,
            g,
            b,
            hex: format!("#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// One 256-colour palette from the PLAYPAL lump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadPalette {
    pub colours: Vec<WadColour>,
}

/// The full PLAYPAL set: 14 palettes of 256 RGB triples each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadPlaypal {
    pub palettes: Vec<WadPalette>,
}

/// The COLORMAP light-remapping set: 34 tables, each mapping a palette
/// index to a darkened/tinted palette index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadColorMap {
    pub maps: Vec<[u8; 256]>,
}

/// One vertical run of pixels in a patch column. A post whose `y_offset`
/// is the sentinel `255` is a zero-length terminal post ending the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadPatchPost {
    /// Vertical start offset of this run within the column
    pub y_offset: u8,
    /// Palette indices for the run
    pub pixels: Vec<u8>,
}

/// An RLE-encoded sub-image composed of vertical posts per column.
///
/// The lump header is 4 u16/i16 fields (width, height, x/y origin offset)
/// followed by `width` 4-byte column offsets into the same lump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadPatch {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub x_offset: i16,
    pub y_offset: i16,
    /// Posts per column, in column order
    pub columns: Vec<Vec<WadPatchPost>>,
}

/// A single patch placement inside a composite texture (10 bytes each)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadTexPatch {
    /// Offset of the patch origin within the texture
    pub x_offset: i16,
    pub y_offset: i16,
    /// Index into the PNAMES table
    pub patch_index: u16,
    pub step_dir: i16,
    pub colormap: i16,
}

/// A named composite texture built from patch placements (22-byte header
/// followed by `patch_count` placement records)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadTexture {
    pub name: String,
    pub masked: bool,
    pub width: i16,
    pub height: i16,
    pub patches: Vec<WadTexPatch>,
}

/// Everything texture-related decoded from one WAD: the two texture
/// lumps, the patch-name table and the patch images present in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WadTextures {
    pub texture1: Vec<WadTexture>,
    pub texture2: Vec<WadTexture>,
    /// PNAMES entries, upper-cased, empty slots dropped at the tail
    pub patch_names: Vec<String>,
    /// Patch images keyed by (upper-cased) name. A placement whose patch
    /// has no image lump in this WAD is expected, not an error.
    pub patches: HashMap<String, WadPatch>,
}

impl WadTextures {
    /// Resolve a placement's PNAMES index to its decoded patch image, if
    /// the image lump was present in this WAD.
    pub fn patch_for(&self, placement: &WadTexPatch) -> Option<&WadPatch> {
        let name = self.patch_names.get(placement.patch_index as usize)?;
        self.patches.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thing_flags_extract() {
        assert!(ThingFlag::extract(0).is_empty());
        let all = ThingFlag::extract(0x1f);
        assert_eq!(all.len(), 5);
        let easy_ambush = ThingFlag::extract(0x09);
        assert_eq!(easy_ambush, vec![ThingFlag::SkillEasy, ThingFlag::Ambush]);
    }

    #[test]
    fn linedef_flags_extract() {
        let flags = LineDefFlag::extract(0x0025);
        assert_eq!(
            flags,
            vec![
                LineDefFlag::Blocking,
                LineDefFlag::TwoSided,
                LineDefFlag::Secret
            ]
        );
    }

    #[test]
    fn two_sided_comes_from_flag_bit() {
        // The flag decides even when the back side is the 0xFFFF sentinel
        let line = WadLineDef::new(0, 1, 0x0004, 0, 0, 2, None);
        assert!(line.is_two_sided());
        // A present back side without the flag is not two-sided
        let line = WadLineDef::new(0, 1, 0x0001, 0, 0, 2, Some(3));
        assert!(!line.is_two_sided());
    }

    #[test]
    fn colour_hex_formatting() {
        let c = WadColour::new(255, 0, 16);
        assert_eq!(c.hex, "#ff0010");
    }

    #[test]
    fn sector_secret_marker() {
        let sector = WadSector {
            floor_height: 0,
            ceil_height: 72,
            floor_tex: "FLOOR4_8".into(),
            ceil_tex: "CEIL3_5".into(),
            light_level: 160,
            kind: SECTOR_SPECIAL_SECRET,
            tag: 0,
        };
        assert!(sector.is_secret());
    }
}
