//! PLAYPAL palette set and COLORMAP light-remap decoding.
//!
//! Both lumps are fixed-shape: PLAYPAL is 14 palettes of 256 RGB triples,
//! COLORMAP is 34 tables of 256 palette-index remaps. A lump smaller than
//! its fixed shape fails with `TruncatedLump` rather than decoding a
//! partial set.

use crate::error::{Result, WadError};
use crate::types::{WadColorMap, WadColour, WadDirEntry, WadPalette, WadPlaypal};
use crate::wad::{find_lump, WadData};

pub const PALETTE_COUNT: usize = 14;
pub const COLORMAP_COUNT: usize = 34;
const PALETTE_BYTES: usize = 256 * 3;

/// Decode the PLAYPAL lump. `None` when the lump is absent, in which case
/// callers fall back to a default palette.
pub fn decode_playpal(wad: &WadData, directory: &[WadDirEntry]) -> Result<Option<WadPlaypal>> {
    let Some(entry) = find_lump(directory, "PLAYPAL") else {
        return Ok(None);
    };
    let (offset, len) = wad.lump_span(entry)?;
    let needed = PALETTE_COUNT * PALETTE_BYTES;
    if len < needed {
        return Err(WadError::TruncatedLump {
            lump: "PLAYPAL",
            expected: needed,
            found: len,
        });
    }

    let mut palettes = Vec::with_capacity(PALETTE_COUNT);
    for p in 0..PALETTE_COUNT {
        let base = offset + p * PALETTE_BYTES;
        let mut colours = Vec::with_capacity(256);
        for i in 0..256 {
            let at = base + i * 3;
            colours.push(WadColour::new(
                wad.u8_at(at),
                wad.u8_at(at + 1),
                wad.u8_at(at + 2),
            ));
        }
        palettes.push(WadPalette { colours });
    }
    Ok(Some(WadPlaypal { palettes }))
}

/// Decode the COLORMAP lump. `None` when the lump is absent.
pub fn decode_colormap(wad: &WadData, directory: &[WadDirEntry]) -> Result<Option<WadColorMap>> {
    let Some(entry) = find_lump(directory, "COLORMAP") else {
        return Ok(None);
    };
    let (offset, len) = wad.lump_span(entry)?;
    let needed = COLORMAP_COUNT * 256;
    if len < needed {
        return Err(WadError::TruncatedLump {
            lump: "COLORMAP",
            expected: needed,
            found: len,
        });
    }

    let mut maps = Vec::with_capacity(COLORMAP_COUNT);
    for m in 0..COLORMAP_COUNT {
        let mut table = [0u8; 256];
        table.copy_from_slice(wad.bytes_at(offset + m * 256, 256));
        maps.push(table);
    }
    Ok(Some(WadColorMap { maps }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entry(name: &str, offset: u32, size: u32) -> WadDirEntry {
        WadDirEntry::new(offset, size, name.to_string())
    }

    #[test]
    fn playpal_absent_is_none() {
        let wad = WadData::from_bytes("p", Vec::new());
        assert!(decode_playpal(&wad, &[]).unwrap().is_none());
    }

    #[test]
    fn playpal_full_shape() {
        let mut buf = Vec::with_capacity(PALETTE_COUNT * PALETTE_BYTES);
        for p in 0..PALETTE_COUNT {
            for i in 0..256usize {
                buf.push(p as u8);
                buf.push(i as u8);
                buf.push(255 - i as u8);
            }
        }
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("p", buf);
        let dir = vec![dir_entry("PLAYPAL", 0, size)];
        let playpal = decode_playpal(&wad, &dir).unwrap().unwrap();
        assert_eq!(playpal.palettes.len(), PALETTE_COUNT);
        let c = &playpal.palettes[13].colours[16];
        assert_eq!((c.r, c.g, c.b), (13, 16, 239));
        assert_eq!(c.hex, "#0d10ef");
    }

    #[test]
    fn playpal_truncated() {
        let wad = WadData::from_bytes("p", vec![0u8; 100]);
        let dir = vec![dir_entry("PLAYPAL", 0, 100)];
        assert!(matches!(
            decode_playpal(&wad, &dir),
            Err(WadError::TruncatedLump { lump: "PLAYPAL", .. })
        ));
    }

    #[test]
    fn colormap_full_shape() {
        let mut buf = Vec::with_capacity(COLORMAP_COUNT * 256);
        for m in 0..COLORMAP_COUNT {
            for i in 0..256usize {
                buf.push((i as u8).wrapping_add(m as u8));
            }
        }
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("c", buf);
        let dir = vec![dir_entry("COLORMAP", 0, size)];
        let colormap = decode_colormap(&wad, &dir).unwrap().unwrap();
        assert_eq!(colormap.maps.len(), COLORMAP_COUNT);
        assert_eq!(colormap.maps[33][10], 43);
    }

    #[test]
    fn colormap_truncated() {
        let wad = WadData::from_bytes("c", vec![0u8; 256]);
        let dir = vec![dir_entry("COLORMAP", 0, 256)];
        assert!(matches!(
            decode_colormap(&wad, &dir),
            Err(WadError::TruncatedLump { lump: "COLORMAP", .. })
        ));
    }
}
