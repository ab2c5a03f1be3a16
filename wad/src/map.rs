//! Map groups and per-map decoding.
//!
//! A map in the directory is a marker entry (`E1M1`, `MAP01`, ...)
//! followed by a fixed, ordered run of per-map lumps. This module finds
//! those runs, decodes each lump kind, and assembles the results into one
//! `WadMap` per marker with an explicit per-lump status.

use log::warn;

use crate::error::{Result, WadError};
use crate::nodes::WadNode;
use crate::things::{group_of, name_of, ThingGroup};
use crate::types::{
    ThingFlag, WadBlockMap, WadDirEntry, WadLineDef, WadRejectTable, WadSector, WadSegment,
    WadSideDef, WadSubSector, WadThing, WadVertex,
};
use crate::wad::WadData;

/// End-of-cell sentinel in BLOCKMAP line lists
const BLOCKMAP_END: u16 = 0xFFFF;

/// The ten per-map lump kinds, in the order they follow a map marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLump {
    /// Position and angle for all monster, powerup and spawn locations
    Things,
    /// Lines between two VERTEXES entries, pointing at one or two
    /// SIDEDEFS depending on whether the line is a wall or a portal
    LineDefs,
    /// Upper/lower/middle texture info for the sides of a line
    SideDefs,
    /// Signed short X, Y pairs that all map geometry indexes into
    Vertexes,
    /// Portions of lines cut during binary space partitioning
    Segs,
    /// Runs of segments forming convex subspaces, the tree leaves
    SSectors,
    /// The spatial-partition tree over segs and sub-sector leaves
    Nodes,
    /// Floor/ceiling areas with heights, textures and light level
    Sectors,
    /// Sector-to-sector visibility exclusion bit matrix
    Reject,
    /// Uniform grid over the map listing linedefs per cell
    Blockmap,
}

impl MapLump {
    pub const ALL: [MapLump; 10] = [
        MapLump::Things,
        MapLump::LineDefs,
        MapLump::SideDefs,
        MapLump::Vertexes,
        MapLump::Segs,
        MapLump::SSectors,
        MapLump::Nodes,
        MapLump::Sectors,
        MapLump::Reject,
        MapLump::Blockmap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MapLump::Things => "THINGS",
            MapLump::LineDefs => "LINEDEFS",
            MapLump::SideDefs => "SIDEDEFS",
            MapLump::Vertexes => "VERTEXES",
            MapLump::Segs => "SEGS",
            MapLump::SSectors => "SSECTORS",
            MapLump::Nodes => "NODES",
            MapLump::Sectors => "SECTORS",
            MapLump::Reject => "REJECT",
            MapLump::Blockmap => "BLOCKMAP",
        }
    }
}

/// True when the name is one of the ten per-map lump names
pub fn is_map_lump(name: &str) -> bool {
    MapLump::ALL.iter().any(|l| l.name() == name)
}

/// One discovered map: the marker entry's name and the run of per-map
/// lump entries that followed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadMapGroup {
    pub name: String,
    pub lumps: Vec<WadDirEntry>,
}

impl WadMapGroup {
    pub fn find(&self, lump: MapLump) -> Option<&WadDirEntry> {
        self.lumps.iter().find(|e| e.lump_name == lump.name())
    }
}

/// Walk the directory once and group runs of per-map lumps under the
/// marker entry preceding each run. A run at the very start of the
/// directory has no marker to name it and is ignored. Entries outside
/// runs belong to global resources and are none of this function's
/// business.
pub fn decode_map_groups(directory: &[WadDirEntry]) -> Vec<WadMapGroup> {
    let mut groups = Vec::new();
    let mut current: Option<WadMapGroup> = None;
    // Set while skipping a run that opened at the directory start; every
    // member of that run is dropped, not just its first entry.
    let mut unnamed_run = false;

    for (idx, entry) in directory.iter().enumerate() {
        if is_map_lump(&entry.lump_name) {
            if let Some(group) = &mut current {
                group.lumps.push(entry.clone());
            } else if !unnamed_run {
                if idx == 0 {
                    unnamed_run = true;
                } else {
                    current = Some(WadMapGroup {
                        name: directory[idx - 1].lump_name.clone(),
                        lumps: vec![entry.clone()],
                    });
                }
            }
        } else {
            unnamed_run = false;
            if let Some(group) = current.take() {
                groups.push(group);
            }
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }
    groups
}

/// Which optional, O(map)-heavy lumps to decode. Everything defaults to
/// "skip"; skipping shows up as an explicit [`LumpState::Skipped`] on the
/// assembled map, never as a silently empty value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapDecodeOptions {
    pub segments: bool,
    pub subsectors: bool,
    pub nodes: bool,
    pub reject: bool,
    /// Decode the per-cell blockmap line lists, not just the grid header
    pub blockmap_detail: bool,
}

impl MapDecodeOptions {
    pub fn all() -> Self {
        MapDecodeOptions {
            segments: true,
            subsectors: true,
            nodes: true,
            reject: true,
            blockmap_detail: true,
        }
    }
}

/// Decode outcome for one lump of one map. A failure here is isolated:
/// sibling lumps and other maps keep decoding.
#[derive(Debug)]
pub enum LumpState<T> {
    Decoded(T),
    /// Not requested via `MapDecodeOptions`
    Skipped,
    /// The lump is not present in this map's group
    Absent,
    Failed(WadError),
}

impl<T> LumpState<T> {
    pub fn as_decoded(&self) -> Option<&T> {
        match self {
            LumpState::Decoded(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, LumpState::Skipped)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LumpState::Failed(_))
    }
}

/// A `WadThing` joined with its static classification: canonical name,
/// group, group-derived marker size, and the expanded spawn flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapThing {
    pub thing: WadThing,
    pub name: &'static str,
    pub group: ThingGroup,
    pub size: u16,
    pub flags: Vec<ThingFlag>,
}

impl MapThing {
    fn classify(thing: WadThing) -> Self {
        let group = group_of(thing.kind);
        MapThing {
            name: name_of(thing.kind),
            group,
            size: group.render_size(),
            flags: thing.flag_names(),
            thing,
        }
    }
}

/// One fully assembled map. Each lump slot records whether it decoded,
/// was skipped, was absent from the group, or failed.
#[derive(Debug)]
pub struct WadMap {
    pub name: String,
    pub things: LumpState<Vec<MapThing>>,
    pub vertexes: LumpState<Vec<WadVertex>>,
    pub linedefs: LumpState<Vec<WadLineDef>>,
    pub sidedefs: LumpState<Vec<WadSideDef>>,
    pub sectors: LumpState<Vec<WadSector>>,
    pub segments: LumpState<Vec<WadSegment>>,
    pub subsectors: LumpState<Vec<WadSubSector>>,
    pub nodes: LumpState<Vec<WadNode>>,
    pub reject: LumpState<WadRejectTable>,
    pub blockmap: LumpState<WadBlockMap>,
    /// Min/max vertex extent, when VERTEXES decoded
    pub bounds: Option<(WadVertex, WadVertex)>,
}

fn decode_slot<T>(
    map_name: &str,
    lump: MapLump,
    entry: Option<&WadDirEntry>,
    decode: impl FnOnce(&WadDirEntry) -> Result<T>,
) -> LumpState<T> {
    match entry {
        None => LumpState::Absent,
        Some(entry) => match decode(entry) {
            Ok(t) => LumpState::Decoded(t),
            Err(e) => {
                warn!("{map_name}: {} failed: {e}", lump.name());
                LumpState::Failed(e)
            }
        },
    }
}

/// Decode one map group into a `WadMap`, honouring `options` for the
/// heavy lumps. Failures are isolated per lump.
pub fn decode_map(wad: &WadData, group: &WadMapGroup, options: &MapDecodeOptions) -> WadMap {
    let name = group.name.as_str();

    let things = decode_slot(name, MapLump::Things, group.find(MapLump::Things), |e| {
        Ok(wad
            .thing_iter(e)?
            .map(MapThing::classify)
            .collect::<Vec<_>>())
    });
    let vertexes = decode_slot(name, MapLump::Vertexes, group.find(MapLump::Vertexes), |e| {
        Ok(wad.vertex_iter(e)?.collect::<Vec<_>>())
    });
    let linedefs = decode_slot(name, MapLump::LineDefs, group.find(MapLump::LineDefs), |e| {
        Ok(wad.linedef_iter(e)?.collect::<Vec<_>>())
    });
    let sidedefs = decode_slot(name, MapLump::SideDefs, group.find(MapLump::SideDefs), |e| {
        Ok(wad.sidedef_iter(e)?.collect::<Vec<_>>())
    });
    let sectors = decode_slot(name, MapLump::Sectors, group.find(MapLump::Sectors), |e| {
        Ok(wad.sector_iter(e)?.collect::<Vec<_>>())
    });

    let segments = if options.segments {
        decode_slot(name, MapLump::Segs, group.find(MapLump::Segs), |e| {
            Ok(wad.segment_iter(e)?.collect::<Vec<_>>())
        })
    } else {
        LumpState::Skipped
    };
    let subsectors = if options.subsectors {
        decode_slot(name, MapLump::SSectors, group.find(MapLump::SSectors), |e| {
            Ok(wad.subsector_iter(e)?.collect::<Vec<_>>())
        })
    } else {
        LumpState::Skipped
    };
    let nodes = if options.nodes {
        decode_slot(name, MapLump::Nodes, group.find(MapLump::Nodes), |e| {
            Ok(wad.node_iter(e)?.collect::<Vec<_>>())
        })
    } else {
        LumpState::Skipped
    };

    // REJECT needs the sector count; without decoded sectors there is no
    // side length to chunk the bit stream into.
    let reject = if options.reject {
        match sectors.as_decoded() {
            Some(secs) => {
                let count = secs.len();
                decode_slot(name, MapLump::Reject, group.find(MapLump::Reject), |e| {
                    decode_reject(wad, e, count)
                })
            }
            None => {
                if group.find(MapLump::Reject).is_some() {
                    warn!("{name}: REJECT skipped, no decoded SECTORS to size it");
                }
                LumpState::Skipped
            }
        }
    } else {
        LumpState::Skipped
    };

    let blockmap = decode_slot(name, MapLump::Blockmap, group.find(MapLump::Blockmap), |e| {
        decode_blockmap(wad, e, options.blockmap_detail)
    });

    let bounds = vertexes.as_decoded().and_then(|verts| map_bounds(verts));

    WadMap {
        name: group.name.clone(),
        things,
        vertexes,
        linedefs,
        sidedefs,
        sectors,
        segments,
        subsectors,
        nodes,
        reject,
        blockmap,
        bounds,
    }
}

fn map_bounds(vertexes: &[WadVertex]) -> Option<(WadVertex, WadVertex)> {
    let first = vertexes.first()?;
    let mut min = *first;
    let mut max = *first;
    for v in vertexes {
        min.x = min.x.min(v.x);
        min.y = min.y.min(v.y);
        max.x = max.x.max(v.x);
        max.y = max.y.max(v.y);
    }
    Some((min, max))
}

/// Unpack the REJECT bit matrix. Bits map onto sequential sector pairs
/// least-significant first; the flat bit stream is re-chunked into
/// `sector_count` rows and byte-alignment padding past the square is
/// discarded.
pub fn decode_reject(
    wad: &WadData,
    entry: &WadDirEntry,
    sector_count: usize,
) -> Result<WadRejectTable> {
    let (offset, len) = wad.lump_span(entry)?;
    let needed = (sector_count * sector_count + 7) / 8;
    if len < needed {
        return Err(WadError::TruncatedLump {
            lump: "REJECT",
            expected: needed,
            found: len,
        });
    }

    let mut bits = Vec::with_capacity(len * 8);
    for byte in wad.bytes_at(offset, needed) {
        for bit in 0..8 {
            bits.push(byte >> bit & 1 == 1);
        }
    }

    let table = (0..sector_count)
        .map(|row| bits[row * sector_count..(row + 1) * sector_count].to_vec())
        .collect();
    Ok(WadRejectTable::new(table))
}

/// Decode the BLOCKMAP header, and when `detail` is set the full per-cell
/// line lists. Cell run lengths come from the next cell's offset; the
/// last cell is scanned forward to its `0xFFFF` sentinel. The leading `0`
/// and trailing `0xFFFF` markers are stripped from each list.
pub fn decode_blockmap(wad: &WadData, entry: &WadDirEntry, detail: bool) -> Result<WadBlockMap> {
    let (offset, len) = wad.lump_span(entry)?;
    if len < 8 {
        return Err(WadError::TruncatedLump {
            lump: "BLOCKMAP",
            expected: 8,
            found: len,
        });
    }

    let x_origin = wad.i16_at(offset);
    let y_origin = wad.i16_at(offset + 2);
    let columns = wad.u16_at(offset + 4);
    let rows = wad.u16_at(offset + 6);

    if !detail {
        return Ok(WadBlockMap {
            x_origin,
            y_origin,
            columns,
            rows,
            cell_lines: None,
        });
    }

    let cells = columns as usize * rows as usize;
    let table_end = 8 + cells * 2;
    if len < table_end {
        return Err(WadError::TruncatedLump {
            lump: "BLOCKMAP",
            expected: table_end,
            found: len,
        });
    }

    // Offsets are stored as indices into 16-bit words from the lump start
    let offsets: Vec<usize> = (0..cells)
        .map(|i| wad.u16_at(offset + 8 + i * 2) as usize * 2)
        .collect();

    let mut cell_lines = Vec::with_capacity(cells);
    for (i, &start) in offsets.iter().enumerate() {
        let mut list = Vec::new();
        if i + 1 < cells {
            let end = offsets[i + 1].min(len);
            let mut pos = start;
            while pos + 2 <= end {
                list.push(wad.u16_at(offset + pos));
                pos += 2;
            }
        } else {
            // Last cell: no following offset, scan to the sentinel
            let mut pos = start;
            while pos + 2 <= len {
                let value = wad.u16_at(offset + pos);
                list.push(value);
                pos += 2;
                if value == BLOCKMAP_END {
                    break;
                }
            }
        }
        if list.first() == Some(&0) {
            list.remove(0);
        }
        if list.last() == Some(&BLOCKMAP_END) {
            list.pop();
        }
        cell_lines.push(list);
    }

    Ok(WadBlockMap {
        x_origin,
        y_origin,
        columns,
        rows,
        cell_lines: Some(cell_lines),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, offset: u32, size: u32) -> WadDirEntry {
        WadDirEntry::new(offset, size, name.to_string())
    }

    fn marker(name: &str) -> WadDirEntry {
        entry(name, 0, 0)
    }

    #[test]
    fn groups_split_on_markers() {
        let dir = vec![
            marker("E1M1"),
            entry("THINGS", 0, 0),
            entry("LINEDEFS", 0, 0),
            marker("E1M2"),
            entry("THINGS", 0, 0),
            entry("PLAYPAL", 0, 0),
            marker("E1M3"),
            entry("VERTEXES", 0, 0),
        ];
        let groups = decode_map_groups(&dir);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "E1M1");
        assert_eq!(groups[0].lumps.len(), 2);
        assert_eq!(groups[1].name, "E1M2");
        assert_eq!(groups[1].lumps.len(), 1);
        // Trailing run is closed by end of directory
        assert_eq!(groups[2].name, "E1M3");
        assert_eq!(groups[2].lumps.len(), 1);
    }

    #[test]
    fn run_at_directory_start_has_no_marker() {
        // The whole leading run is dropped, not just its first entry; a
        // phantom group named after a map lump must never appear
        let dir = vec![entry("THINGS", 0, 0), entry("VERTEXES", 0, 0)];
        assert!(decode_map_groups(&dir).is_empty());
    }

    #[test]
    fn leading_run_does_not_swallow_later_maps() {
        let dir = vec![
            entry("THINGS", 0, 0),
            entry("VERTEXES", 0, 0),
            marker("E1M1"),
            entry("THINGS", 0, 0),
        ];
        let groups = decode_map_groups(&dir);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "E1M1");
        assert_eq!(groups[0].lumps.len(), 1);
    }

    #[test]
    fn non_map_lumps_outside_runs_are_ignored() {
        let dir = vec![marker("PLAYPAL"), marker("COLORMAP"), marker("PNAMES")];
        assert!(decode_map_groups(&dir).is_empty());
    }

    #[test]
    fn reject_round_trip() {
        // 3 sectors: 9 bits. Reference matrix, row-major, LSB-first:
        // row0: 0,1,0  row1: 1,0,1  row2: 0,0,1
        // Flat stream: 0 1 0 1 0 1 0 0 | 1 ...
        // byte0 LSB-first = 0b00101010 = 0x2A, byte1 = 0b00000001
        let buf = vec![0x2A, 0x01];
        let wad = WadData::from_bytes("r", buf);
        let table = decode_reject(&wad, &entry("REJECT", 0, 2), 3).unwrap();
        assert_eq!(table.sector_count(), 3);
        let expected = [
            [false, true, false],
            [true, false, true],
            [false, false, true],
        ];
        for (i, row) in expected.iter().enumerate() {
            for (j, &want) in row.iter().enumerate() {
                assert_eq!(table.is_rejected(i, j), want, "at [{i}][{j}]");
            }
        }
    }

    #[test]
    fn reject_truncated() {
        let wad = WadData::from_bytes("r", vec![0x00]);
        // 4 sectors need 2 bytes
        assert!(matches!(
            decode_reject(&wad, &entry("REJECT", 0, 1), 4),
            Err(WadError::TruncatedLump { lump: "REJECT", .. })
        ));
    }

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn blockmap_detail_2x2() {
        // Header: origin (-128, -64), 2 columns, 2 rows
        let mut buf = Vec::new();
        push_u16(&mut buf, (-128i16) as u16);
        push_u16(&mut buf, (-64i16) as u16);
        push_u16(&mut buf, 2);
        push_u16(&mut buf, 2);
        // Offset table (in words). Cell data starts at word 8 (byte 16).
        push_u16(&mut buf, 8); // cell 0: [0, 1, 2, FFFF]  -> words 8..12
        push_u16(&mut buf, 12); // cell 1: [0, FFFF]        -> words 12..14
        push_u16(&mut buf, 14); // cell 2: [0, 7, FFFF]     -> words 14..17
        push_u16(&mut buf, 17); // cell 3: [0, 3, FFFF]     -> words 17..20
        for v in [0, 1, 2, BLOCKMAP_END] {
            push_u16(&mut buf, v);
        }
        for v in [0, BLOCKMAP_END] {
            push_u16(&mut buf, v);
        }
        for v in [0, 7, BLOCKMAP_END] {
            push_u16(&mut buf, v);
        }
        for v in [0, 3, BLOCKMAP_END] {
            push_u16(&mut buf, v);
        }

        let wad = WadData::from_bytes("b", buf.clone());
        let bm = decode_blockmap(&wad, &entry("BLOCKMAP", 0, buf.len() as u32), true).unwrap();
        assert_eq!(bm.x_origin, -128);
        assert_eq!(bm.y_origin, -64);
        assert_eq!(bm.columns, 2);
        assert_eq!(bm.rows, 2);
        let lists = bm.cell_lines.as_ref().unwrap();
        assert_eq!(lists[0], vec![1, 2]);
        assert_eq!(lists[1], Vec::<u16>::new());
        assert_eq!(lists[2], vec![7]);
        assert_eq!(lists[3], vec![3]);
        assert_eq!(bm.cell(1, 1), Some(&[3u16][..]));
    }

    #[test]
    fn blockmap_header_only_by_default() {
        let mut buf = Vec::new();
        for v in [0u16, 0, 1, 1] {
            push_u16(&mut buf, v);
        }
        let wad = WadData::from_bytes("b", buf);
        let bm = decode_blockmap(&wad, &entry("BLOCKMAP", 0, 8), false).unwrap();
        assert!(bm.cell_lines.is_none());
    }

    #[test]
    fn map_decode_isolates_lump_failures() {
        // THINGS points past the buffer; VERTEXES is fine
        let mut buf = vec![0u8; 16];
        for v in [10i16, 20, -30, 40] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let wad = WadData::from_bytes("m", buf);
        let group = WadMapGroup {
            name: "E1M1".to_string(),
            lumps: vec![entry("THINGS", 9999, 10), entry("VERTEXES", 16, 8)],
        };
        let map = decode_map(&wad, &group, &MapDecodeOptions::default());
        assert!(map.things.is_failed());
        let verts = map.vertexes.as_decoded().unwrap();
        assert_eq!(verts.len(), 2);
        assert_eq!(map.bounds, Some((WadVertex::new(-30, 20), WadVertex::new(10, 40))));
        // Heavy lumps were not requested
        assert!(map.segments.is_skipped());
        assert!(map.nodes.is_skipped());
        assert!(map.reject.is_skipped());
        // Absent lumps are reported as such
        assert!(matches!(map.sectors, LumpState::Absent));
    }

    #[test]
    fn map_thing_classification() {
        let mut buf = Vec::new();
        for v in [10i16, 20, 90, 1, 0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        let wad = WadData::from_bytes("m", buf);
        let group = WadMapGroup {
            name: "E1M1".to_string(),
            lumps: vec![entry("THINGS", 0, 10)],
        };
        let map = decode_map(&wad, &group, &MapDecodeOptions::default());
        let things = map.things.as_decoded().unwrap();
        assert_eq!(things.len(), 1);
        let t = &things[0];
        assert_eq!((t.thing.x, t.thing.y), (10, 20));
        assert_eq!(t.thing.angle, 90);
        assert_eq!(t.name, "PLAYER_1_START");
        assert_eq!(t.group, ThingGroup::Other);
        assert_eq!(t.size, ThingGroup::Other.render_size());
        assert!(t.flags.is_empty());
    }
}
