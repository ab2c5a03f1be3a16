//! PNAMES, TEXTURE1/TEXTURE2 and patch-image decoding.
//!
//! Textures are composite images: a texture names patches by index into
//! the PNAMES table and places each at an offset. Patch images themselves
//! are RLE-encoded per column as runs of "posts". A placement whose patch
//! has no image lump in the file is expected (the image may live in the
//! IWAD), so lookups are per-name and misses are silent.

use std::collections::HashMap;

use log::warn;

use crate::error::{Result, WadError};
use crate::types::{
    WadDirEntry, WadPatch, WadPatchPost, WadTexPatch, WadTexture, WadTextures,
};
use crate::wad::{find_lump, WadData};

/// Start-offset byte ending a patch column
const COLUMN_END: u8 = 0xFF;
/// Upper bound on posts per column. Malformed streams can omit the
/// column terminator, so every column decode is bounded.
const POST_WATCHDOG: usize = 100;

const TEXTURE_HEADER_SIZE: usize = 22;
const TEX_PATCH_SIZE: usize = 10;

/// Decode everything texture-related: the PNAMES table, both texture
/// lumps, and the patch images present in this file. `None` when PNAMES
/// is absent, since nothing else can be resolved without it.
pub fn decode_textures(wad: &WadData, directory: &[WadDirEntry]) -> Result<Option<WadTextures>> {
    let Some(pnames) = find_lump(directory, "PNAMES") else {
        return Ok(None);
    };
    let patch_names = decode_pnames(wad, pnames)?;

    let texture1 = match find_lump(directory, "TEXTURE1") {
        Some(entry) => decode_texture_lump(wad, entry, "TEXTURE1")?,
        None => Vec::new(),
    };
    let texture2 = match find_lump(directory, "TEXTURE2") {
        Some(entry) => decode_texture_lump(wad, entry, "TEXTURE2")?,
        None => Vec::new(),
    };

    let mut patches = HashMap::new();
    for name in &patch_names {
        let Some(entry) = find_lump(directory, name) else {
            continue;
        };
        match decode_patch(wad, entry) {
            Ok(patch) => {
                patches.insert(name.clone(), patch);
            }
            Err(e) => warn!("patch {name} failed: {e}"),
        }
    }

    Ok(Some(WadTextures {
        texture1,
        texture2,
        patch_names,
        patches,
    }))
}

/// PNAMES: a 4-byte count then fixed 8-byte name slots. Names are
/// upper-cased on read, the format being historically case-insensitive.
/// Empty slots at the tail are dropped; interior slots are kept so that
/// placement indices stay valid.
pub fn decode_pnames(wad: &WadData, entry: &WadDirEntry) -> Result<Vec<String>> {
    let (offset, len) = wad.lump_span(entry)?;
    if len < 4 {
        return Err(WadError::TruncatedLump {
            lump: "PNAMES",
            expected: 4,
            found: len,
        });
    }
    let count = wad.u32_at(offset) as usize;
    let needed = 4 + count * 8;
    if len < needed {
        return Err(WadError::TruncatedLump {
            lump: "PNAMES",
            expected: needed,
            found: len,
        });
    }

    let mut names: Vec<String> = (0..count)
        .map(|i| wad.name_at(offset + 4 + i * 8, 8).to_uppercase())
        .collect();
    while names.last().is_some_and(|n| n.is_empty()) {
        names.pop();
    }
    Ok(names)
}

/// A texture lump: a 4-byte count, that many 4-byte offsets back into the
/// lump, and at each offset a 22-byte texture header followed by 10-byte
/// patch-placement records. A texture whose declared extent runs past the
/// lump is skipped, not fatal for its siblings.
pub fn decode_texture_lump(
    wad: &WadData,
    entry: &WadDirEntry,
    kind: &'static str,
) -> Result<Vec<WadTexture>> {
    let (offset, len) = wad.lump_span(entry)?;
    if len < 4 {
        return Err(WadError::TruncatedLump {
            lump: kind,
            expected: 4,
            found: len,
        });
    }
    let count = wad.u32_at(offset) as usize;
    let table_end = 4 + count * 4;
    if len < table_end {
        return Err(WadError::TruncatedLump {
            lump: kind,
            expected: table_end,
            found: len,
        });
    }

    let mut textures = Vec::with_capacity(count);
    for i in 0..count {
        let tex_off = wad.u32_at(offset + 4 + i * 4) as usize;
        if tex_off + TEXTURE_HEADER_SIZE > len {
            warn!("{kind}: texture {i} header out of range, skipped");
            continue;
        }
        let base = offset + tex_off;
        let name = wad.name_at(base, 8).to_uppercase();
        let masked = wad.i32_at(base + 8) != 0;
        let width = wad.i16_at(base + 12);
        let height = wad.i16_at(base + 14);
        // 4 unused column-direction bytes at +16
        let patch_count = wad.i16_at(base + 20).max(0) as usize;
        if tex_off + TEXTURE_HEADER_SIZE + patch_count * TEX_PATCH_SIZE > len {
            warn!("{kind}: texture {name} placements out of range, skipped");
            continue;
        }

        let patches = (0..patch_count)
            .map(|p| {
                let at = base + TEXTURE_HEADER_SIZE + p * TEX_PATCH_SIZE;
                WadTexPatch {
                    x_offset: wad.i16_at(at),
                    y_offset: wad.i16_at(at + 2),
                    patch_index: wad.u16_at(at + 4),
                    step_dir: wad.i16_at(at + 6),
                    colormap: wad.i16_at(at + 8),
                }
            })
            .collect();

        textures.push(WadTexture {
            name,
            masked,
            width,
            height,
            patches,
        });
    }
    Ok(textures)
}

/// Decode one patch-image lump. A corrupt column is abandoned and logged;
/// the remaining columns still decode.
pub fn decode_patch(wad: &WadData, entry: &WadDirEntry) -> Result<WadPatch> {
    let (offset, len) = wad.lump_span(entry)?;
    if len < 8 {
        return Err(WadError::TruncatedLump {
            lump: "patch",
            expected: 8,
            found: len,
        });
    }
    let width = wad.u16_at(offset);
    let height = wad.u16_at(offset + 2);
    let x_offset = wad.i16_at(offset + 4);
    let y_offset = wad.i16_at(offset + 6);

    let table_end = 8 + width as usize * 4;
    if len < table_end {
        return Err(WadError::TruncatedLump {
            lump: "patch",
            expected: table_end,
            found: len,
        });
    }

    let mut columns = Vec::with_capacity(width as usize);
    for col in 0..width as usize {
        let col_off = wad.u32_at(offset + 8 + col * 4) as usize;
        match decode_column(wad, &entry.lump_name, col, offset, len, col_off) {
            Ok(posts) => columns.push(posts),
            Err(e) => {
                warn!("{e}");
                columns.push(Vec::new());
            }
        }
    }

    Ok(WadPatch {
        name: entry.lump_name.to_uppercase(),
        width,
        height,
        x_offset,
        y_offset,
        columns,
    })
}

/// Decode one column's run of posts. Each post is a 1-byte vertical
/// start, 1-byte run length, a pad byte, the run data, and a trailing pad
/// byte. The terminal post (start byte 255) is emitted zero-length, then
/// the column ends. Running past the watchdog or the lump extent is a
/// corruption condition.
fn decode_column(
    wad: &WadData,
    patch: &str,
    column: usize,
    lump_offset: usize,
    lump_len: usize,
    start: usize,
) -> Result<Vec<WadPatchPost>> {
    let corrupt = || WadError::CorruptPatchColumn {
        patch: patch.to_string(),
        column,
    };

    let mut posts = Vec::new();
    let mut pos = start;
    for _ in 0..POST_WATCHDOG {
        if pos >= lump_len {
            return Err(corrupt());
        }
        let top = wad.u8_at(lump_offset + pos);
        if top == COLUMN_END {
            posts.push(WadPatchPost {
                y_offset: COLUMN_END,
                pixels: Vec::new(),
            });
            return Ok(posts);
        }
        if pos + 2 > lump_len {
            return Err(corrupt());
        }
        let length = wad.u8_at(lump_offset + pos + 1) as usize;
        if pos + 4 + length > lump_len {
            return Err(corrupt());
        }
        posts.push(WadPatchPost {
            y_offset: top,
            pixels: wad.bytes_at(lump_offset + pos + 3, length).to_vec(),
        });
        pos += 4 + length;
    }
    Err(corrupt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_entry(name: &str, offset: u32, size: u32) -> WadDirEntry {
        WadDirEntry::new(offset, size, name.to_string())
    }

    fn push_u16(buf: &mut Vec<u8>, v: u16) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn push_name(buf: &mut Vec<u8>, name: &str) {
        let mut bytes = [0u8; 8];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&bytes);
    }

    /// One-column patch: two posts then the column terminator.
    fn patch_buffer() -> Vec<u8> {
        let mut buf = Vec::new();
        push_u16(&mut buf, 1); // width
        push_u16(&mut buf, 16); // height
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u32(&mut buf, 12); // column 0 offset
        buf.extend_from_slice(&[0, 2, 0, 5, 6, 0]); // post at y=0, two pixels
        buf.extend_from_slice(&[4, 1, 0, 7, 0]); // post at y=4, one pixel
        buf.push(COLUMN_END);
        buf
    }

    #[test]
    fn patch_two_posts_and_terminator() {
        let buf = patch_buffer();
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        let patch = decode_patch(&wad, &dir_entry("SW1BRN1", 0, size)).unwrap();
        assert_eq!(patch.width, 1);
        assert_eq!(patch.height, 16);
        let posts = &patch.columns[0];
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].y_offset, 0);
        assert_eq!(posts[0].pixels, vec![5, 6]);
        assert_eq!(posts[1].y_offset, 4);
        assert_eq!(posts[1].pixels, vec![7]);
        // The terminal marker post carries no pixels
        assert_eq!(posts[2].y_offset, COLUMN_END);
        assert!(posts[2].pixels.is_empty());
    }

    #[test]
    fn missing_sentinel_trips_watchdog() {
        // More zero-length posts than the watchdog allows, no sentinel
        let mut buf = Vec::new();
        push_u16(&mut buf, 1);
        push_u16(&mut buf, 8);
        push_u16(&mut buf, 0);
        push_u16(&mut buf, 0);
        push_u32(&mut buf, 12);
        for _ in 0..POST_WATCHDOG + 20 {
            buf.extend_from_slice(&[0, 0, 0, 0]);
        }
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        let err = decode_column(&wad, "BROKEN", 0, 0, size as usize, 12).unwrap_err();
        assert!(matches!(
            err,
            WadError::CorruptPatchColumn { ref patch, column: 0 } if patch == "BROKEN"
        ));
        // The patch as a whole still decodes, with that column abandoned
        let patch = decode_patch(&wad, &dir_entry("BROKEN", 0, size)).unwrap();
        assert!(patch.columns[0].is_empty());
    }

    #[test]
    fn column_running_off_lump_is_corrupt() {
        let mut buf = patch_buffer();
        buf.truncate(buf.len() - 4);
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        let patch = decode_patch(&wad, &dir_entry("SHORT", 0, size)).unwrap();
        assert!(patch.columns[0].is_empty());
    }

    #[test]
    fn pnames_uppercased_tail_trimmed() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 3);
        push_name(&mut buf, "body");
        push_name(&mut buf, "SW1S0");
        push_name(&mut buf, "");
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        let names = decode_pnames(&wad, &dir_entry("PNAMES", 0, size)).unwrap();
        assert_eq!(names, vec!["BODY".to_string(), "SW1S0".to_string()]);
    }

    #[test]
    fn pnames_truncated() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 10);
        push_name(&mut buf, "BODY");
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        assert!(matches!(
            decode_pnames(&wad, &dir_entry("PNAMES", 0, size)),
            Err(WadError::TruncatedLump { lump: "PNAMES", .. })
        ));
    }

    /// TEXTURE1 with one texture of two placements, and a PNAMES + patch
    /// image pair to resolve against.
    #[test]
    fn texture_lump_and_composition() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 1); // texture count
        push_u32(&mut buf, 12); // texture 0 offset
        push_u32(&mut buf, 0xDEAD_BEEF); // unrelated filler the offset skips
        push_name(&mut buf, "STARTAN3");
        push_u32(&mut buf, 0); // masked
        push_u16(&mut buf, 128); // width
        push_u16(&mut buf, 72); // height
        push_u32(&mut buf, 0); // unused column direction
        push_u16(&mut buf, 2); // patch count
        for (x, index) in [(0i16, 0u16), (64, 1)] {
            push_u16(&mut buf, x as u16);
            push_u16(&mut buf, 0); // y offset
            push_u16(&mut buf, index);
            push_u16(&mut buf, 1); // step dir
            push_u16(&mut buf, 0); // colormap
        }
        let tex_size = buf.len() as u32;

        let mut pnames = Vec::new();
        push_u32(&mut pnames, 2);
        push_name(&mut pnames, "sw1brn1");
        push_name(&mut pnames, "MISSING");
        let pnames_off = buf.len() as u32;
        let pnames_size = pnames.len() as u32;
        buf.extend_from_slice(&pnames);

        let image = patch_buffer();
        let image_off = buf.len() as u32;
        let image_size = image.len() as u32;
        buf.extend_from_slice(&image);

        let dir = vec![
            dir_entry("TEXTURE1", 0, tex_size),
            dir_entry("PNAMES", pnames_off, pnames_size),
            dir_entry("SW1BRN1", image_off, image_size),
        ];
        let wad = WadData::from_bytes("t", buf);
        let textures = decode_textures(&wad, &dir).unwrap().unwrap();

        assert_eq!(textures.patch_names, vec!["SW1BRN1", "MISSING"]);
        assert_eq!(textures.texture1.len(), 1);
        assert!(textures.texture2.is_empty());
        let tex = &textures.texture1[0];
        assert_eq!(tex.name, "STARTAN3");
        assert!(!tex.masked);
        assert_eq!((tex.width, tex.height), (128, 72));
        assert_eq!(tex.patches.len(), 2);
        assert_eq!(tex.patches[1].x_offset, 64);
        assert_eq!(tex.patches[1].patch_index, 1);

        // First placement resolves to the decoded image, second has no
        // image lump present and resolves to nothing
        assert_eq!(textures.patch_for(&tex.patches[0]).unwrap().name, "SW1BRN1");
        assert!(textures.patch_for(&tex.patches[1]).is_none());
    }

    #[test]
    fn textures_none_without_pnames() {
        let wad = WadData::from_bytes("t", Vec::new());
        assert!(decode_textures(&wad, &[]).unwrap().is_none());
    }

    #[test]
    fn texture_with_bad_offset_is_skipped() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 1);
        push_u32(&mut buf, 9000); // past the lump
        let size = buf.len() as u32;
        let wad = WadData::from_bytes("t", buf);
        let textures = decode_texture_lump(&wad, &dir_entry("TEXTURE1", 0, size), "TEXTURE1");
        assert!(textures.unwrap().is_empty());
    }
}
