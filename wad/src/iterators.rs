//! Lazy fixed-stride record iterators over validated lump byte ranges.
//!
//! Every fixed-stride lump kind decodes the same way: validate the lump
//! extent once against the buffer, then walk it `stride` bytes at a time
//! through a transformer closure. `LumpIter` owns that walk; the methods
//! on `WadData` pair it with the right stride and transformer per lump.

use std::marker::PhantomData;

use crate::error::{Result, WadError};
use crate::nodes::WadNode;
use crate::types::{
    WadDirEntry, WadLineDef, WadSector, WadSegment, WadSideDef, WadSubSector, WadThing, WadVertex,
};
use crate::wad::WadData;

/// Back-sidedef field value meaning "no back side"
pub const NO_SIDEDEF: u16 = 0xFFFF;

pub struct LumpIter<T, F: Fn(usize) -> T> {
    item_size: usize,
    item_count: usize,
    lump_offset: usize,
    current: usize,
    transformer: F,
    _phantom: PhantomData<T>,
}

impl<T, F> Iterator for LumpIter<T, F>
where
    F: Fn(usize) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.item_count {
            let offset = self.lump_offset + self.current * self.item_size;
            let item = (self.transformer)(offset);
            self.current += 1;
            return Some(item);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.item_count - self.current;
        (left, Some(left))
    }
}

impl WadData {
    /// Validate a fixed-stride lump and yield (start offset, record count)
    fn stride_lump(
        &self,
        entry: &WadDirEntry,
        kind: &'static str,
        stride: usize,
    ) -> Result<(usize, usize)> {
        let (offset, len) = self.lump_span(entry)?;
        if len % stride != 0 {
            return Err(WadError::BadStride {
                lump: kind,
                len,
                stride,
            });
        }
        Ok((offset, len / stride))
    }

    pub fn thing_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadThing, impl Fn(usize) -> WadThing + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "THINGS", 10)?;
        Ok(LumpIter {
            item_size: 10,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| {
                WadThing::new(
                    self.i16_at(offset),
                    self.i16_at(offset + 2),
                    self.i16_at(offset + 4),
                    self.i16_at(offset + 6),
                    self.i16_at(offset + 8),
                )
            },
            _phantom: PhantomData,
        })
    }

    pub fn vertex_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadVertex, impl Fn(usize) -> WadVertex + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "VERTEXES", 4)?;
        Ok(LumpIter {
            item_size: 4,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| {
                WadVertex::new(self.i16_at(offset), self.i16_at(offset + 2))
            },
            _phantom: PhantomData,
        })
    }

    pub fn linedef_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadLineDef, impl Fn(usize) -> WadLineDef + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "LINEDEFS", 14)?;
        Ok(LumpIter {
            item_size: 14,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| {
                let back = self.u16_at(offset + 12);
                WadLineDef::new(
                    self.u16_at(offset),
                    self.u16_at(offset + 2),
                    self.u16_at(offset + 4),
                    self.i16_at(offset + 6),
                    self.i16_at(offset + 8),
                    self.u16_at(offset + 10),
                    (back != NO_SIDEDEF).then_some(back),
                )
            },
            _phantom: PhantomData,
        })
    }

    pub fn sidedef_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadSideDef, impl Fn(usize) -> WadSideDef + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "SIDEDEFS", 30)?;
        Ok(LumpIter {
            item_size: 30,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| WadSideDef {
                x_offset: self.i16_at(offset),
                y_offset: self.i16_at(offset + 2),
                upper_tex: self.name_at(offset + 4, 8),
                lower_tex: self.name_at(offset + 12, 8),
                middle_tex: self.name_at(offset + 20, 8),
                sector: self.u16_at(offset + 28),
            },
            _phantom: PhantomData,
        })
    }

    pub fn segment_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadSegment, impl Fn(usize) -> WadSegment + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "SEGS", 12)?;
        Ok(LumpIter {
            item_size: 12,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| WadSegment {
                start_vertex: self.u16_at(offset),
                end_vertex: self.u16_at(offset + 2),
                angle: self.i16_at(offset + 4),
                linedef: self.u16_at(offset + 6),
                direction: self.i16_at(offset + 8),
                offset: self.i16_at(offset + 10),
            },
            _phantom: PhantomData,
        })
    }

    pub fn subsector_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadSubSector, impl Fn(usize) -> WadSubSector + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "SSECTORS", 4)?;
        Ok(LumpIter {
            item_size: 4,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| WadSubSector {
                seg_count: self.u16_at(offset),
                start_seg: self.u16_at(offset + 2),
            },
            _phantom: PhantomData,
        })
    }

    pub fn sector_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadSector, impl Fn(usize) -> WadSector + '_>> {
        let (lump_offset, item_count) = self.stride_lump(entry, "SECTORS", 26)?;
        Ok(LumpIter {
            item_size: 26,
            item_count,
            lump_offset,
            current: 0,
            transformer: move |offset| WadSector {
                floor_height: self.i16_at(offset),
                ceil_height: self.i16_at(offset + 2),
                floor_tex: self.name_at(offset + 4, 8),
                ceil_tex: self.name_at(offset + 12, 8),
                light_level: self.i16_at(offset + 20),
                kind: self.i16_at(offset + 22),
                tag: self.i16_at(offset + 24),
            },
            _phantom: PhantomData,
        })
    }

    /// NODES records with a truncated tail are skipped, not an error, so
    /// the count is the floor division rather than a strict stride check.
    pub fn node_iter(
        &self,
        entry: &WadDirEntry,
    ) -> Result<LumpIter<WadNode, impl Fn(usize) -> WadNode + '_>> {
        let (lump_offset, len) = self.lump_span(entry)?;
        Ok(LumpIter {
            item_size: 28,
            item_count: len / 28,
            lump_offset,
            current: 0,
            transformer: move |offset| {
                WadNode::new(
                    self.i16_at(offset),
                    self.i16_at(offset + 2),
                    self.i16_at(offset + 4),
                    self.i16_at(offset + 6),
                    [
                        [
                            self.i16_at(offset + 8),  // top
                            self.i16_at(offset + 10), // bottom
                            self.i16_at(offset + 12), // left
                            self.i16_at(offset + 14), // right
                        ],
                        [
                            self.i16_at(offset + 16),
                            self.i16_at(offset + 18),
                            self.i16_at(offset + 20),
                            self.i16_at(offset + 22),
                        ],
                    ],
                    self.u16_at(offset + 24),
                    self.u16_at(offset + 26),
                )
            },
            _phantom: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::NodeChild;

    fn lump(name: &str, offset: u32, size: u32) -> WadDirEntry {
        WadDirEntry::new(offset, size, name.to_string())
    }

    fn push_i16(buf: &mut Vec<u8>, v: i16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    #[test]
    fn things_iter_decodes_records() {
        let mut buf = Vec::new();
        for v in [1056i16, -3616, 90, 1, 7, 1008, -3600, 90, 2, 7] {
            push_i16(&mut buf, v);
        }
        let wad = WadData::from_bytes("t", buf);
        let entry = lump("THINGS", 0, 20);

        let mut iter = wad.thing_iter(&entry).unwrap();
        let next = iter.next().unwrap();
        assert_eq!(next.x, 1056);
        assert_eq!(next.y, -3616);
        assert_eq!(next.angle, 90);
        assert_eq!(next.kind, 1);
        assert_eq!(next.flags, 7);

        let next = iter.next().unwrap();
        assert_eq!(next.kind, 2);
        assert!(iter.next().is_none());
    }

    #[test]
    fn things_iter_rejects_bad_stride() {
        let wad = WadData::from_bytes("t", vec![0u8; 15]);
        let entry = lump("THINGS", 0, 15);
        assert!(matches!(
            wad.thing_iter(&entry),
            Err(WadError::BadStride { stride: 10, .. })
        ));
    }

    #[test]
    fn lump_out_of_bounds_is_typed() {
        let wad = WadData::from_bytes("t", vec![0u8; 8]);
        let entry = lump("VERTEXES", 4, 8);
        assert!(matches!(
            wad.vertex_iter(&entry),
            Err(WadError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn linedef_back_sidedef_sentinel() {
        let mut buf = Vec::new();
        for v in [0i16, 1, 1, 0, 0, 2, -1] {
            push_i16(&mut buf, v);
        }
        for v in [1i16, 2, 4, 0, 0, 3, 4] {
            push_i16(&mut buf, v);
        }
        // Flag set but back side absent, as editors can produce
        for v in [2i16, 3, 4, 0, 0, 5, -1] {
            push_i16(&mut buf, v);
        }
        let wad = WadData::from_bytes("t", buf);
        let entry = lump("LINEDEFS", 0, 42);
        let lines: Vec<WadLineDef> = wad.linedef_iter(&entry).unwrap().collect();
        assert_eq!(lines[0].back_sidedef, None);
        assert!(!lines[0].is_two_sided());
        assert_eq!(lines[1].back_sidedef, Some(4));
        assert!(lines[1].is_two_sided());
        // Two-sidedness follows the flag bit, not the sentinel
        assert_eq!(lines[2].back_sidedef, None);
        assert!(lines[2].is_two_sided());
    }

    #[test]
    fn node_iter_tags_children_and_skips_truncated_tail() {
        let mut buf = Vec::new();
        // One whole record
        for v in [1552i16, -2432, 112, 0, 100, -100, -50, 50, 100, -100, -50, 50] {
            push_i16(&mut buf, v);
        }
        buf.extend_from_slice(&0x8000u16.to_le_bytes());
        buf.extend_from_slice(&0x0000u16.to_le_bytes());
        // Truncated tail: 4 stray bytes
        buf.extend_from_slice(&[1, 2, 3, 4]);

        let wad = WadData::from_bytes("t", buf);
        let entry = lump("NODES", 0, 32);
        let nodes: Vec<WadNode> = wad.node_iter(&entry).unwrap().collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children[0], NodeChild::Leaf(0));
        assert_eq!(nodes[0].children[1], NodeChild::Branch(0));
        assert_eq!(nodes[0].bounding_boxes[0], [100, -100, -50, 50]);
    }

    #[test]
    fn sector_iter_reads_names() {
        let mut buf = Vec::new();
        push_i16(&mut buf, 0);
        push_i16(&mut buf, 72);
        buf.extend_from_slice(b"FLOOR4_8");
        buf.extend_from_slice(b"CEIL3_5\0");
        push_i16(&mut buf, 160);
        push_i16(&mut buf, 0);
        push_i16(&mut buf, 0);
        let wad = WadData::from_bytes("t", buf);
        let entry = lump("SECTORS", 0, 26);
        let sectors: Vec<WadSector> = wad.sector_iter(&entry).unwrap().collect();
        assert_eq!(sectors.len(), 1);
        assert_eq!(sectors[0].floor_tex, "FLOOR4_8");
        assert_eq!(sectors[0].ceil_tex, "CEIL3_5");
        assert_eq!(sectors[0].light_level, 160);
    }
}
