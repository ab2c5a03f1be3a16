//! The WAD source buffer, the byte-span reader, and the decoders for the
//! file header and directory. Also home to the decode orchestration which
//! walks the remaining decoders in dependency order and caches the
//! results.

use std::fmt;
use std::path::PathBuf;

use log::{debug, warn};

use crate::colors::{decode_colormap, decode_playpal};
use crate::dehacked::{decode_dehacked, WadDehacked};
use crate::error::{Magic, Result, WadError};
use crate::map::{decode_map, decode_map_groups, MapDecodeOptions, WadMap, WadMapGroup};
use crate::textures::decode_textures;
use crate::types::{WadColorMap, WadDirEntry, WadHeader, WadPlaypal, WadTextures, WadType};

/// Length in bytes of one directory entry
pub const DIR_ENTRY_SIZE: usize = 16;
/// Length in bytes of the file header
pub const HEADER_SIZE: usize = 12;

/// "Where's All (the) Data": the WAD as an array of bytes in memory plus
/// a display name (source file name or URL). Acquiring the bytes over the
/// network or out of an archive is a collaborator's job; this struct only
/// ever reads them.
pub struct WadData {
    name: String,
    data: Vec<u8>,
}

impl fmt::Debug for WadData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WadData {{ name: {}, len: {} }}", self.name, self.data.len())
    }
}

impl WadData {
    /// Read a WAD file from disk into memory
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<WadData> {
        let path = path.into();
        let data = std::fs::read(&path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(WadData { name, data })
    }

    /// Wrap an already-acquired buffer (e.g. fetched or unzipped by a
    /// collaborator) with a display name
    pub fn from_bytes<S: Into<String>>(name: S, data: Vec<u8>) -> WadData {
        WadData {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail with `OutOfBounds` when `offset + len` exceeds the buffer
    pub fn check_span(&self, what: &'static str, offset: usize, len: usize) -> Result<()> {
        if offset.checked_add(len).map_or(true, |end| end > self.data.len()) {
            return Err(WadError::OutOfBounds {
                what,
                offset,
                len,
                buffer: self.data.len(),
            });
        }
        Ok(())
    }

    /// Byte range of a lump, validated against the buffer
    pub fn lump_span(&self, entry: &WadDirEntry) -> Result<(usize, usize)> {
        let offset = entry.lump_offset as usize;
        let len = entry.lump_size as usize;
        self.check_span("lump range", offset, len)?;
        Ok((offset, len))
    }

    // The *_at readers below assume the caller has validated the span;
    // decoders check a whole lump extent once up front, then walk it with
    // plain offset arithmetic.

    pub(crate) fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    pub(crate) fn i16_at(&self, offset: usize) -> i16 {
        self.u16_at(offset) as i16
    }

    pub(crate) fn u32_at(&self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    pub(crate) fn i32_at(&self, offset: usize) -> i32 {
        self.u32_at(offset) as i32
    }

    pub(crate) fn u8_at(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    pub(crate) fn bytes_at(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Read a fixed-width right-padded name field. Stops at the first NUL
    /// or the field width, whichever comes first. Bytes are taken as
    /// single-byte code points, so arbitrary data never panics here.
    pub(crate) fn name_at(&self, offset: usize, width: usize) -> String {
        self.data[offset..offset + width]
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| *b as char)
            .collect()
    }

    /// Decode the 12-byte file header. A pure function of the first 12
    /// bytes; never reads past them.
    pub fn decode_header(&self) -> Result<WadHeader> {
        self.check_span("header", 0, HEADER_SIZE)?;
        let magic = [
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
        ];
        let wad_type =
            WadType::from_magic(&magic).ok_or(WadError::NotAWadFile(Magic(magic)))?;
        Ok(WadHeader {
            wad_type,
            dir_count: self.u32_at(4),
            dir_offset: self.u32_at(8),
        })
    }

    /// Decode the directory the header points at, in file order. Order is
    /// semantically load-bearing: it defines map-group boundaries.
    pub fn decode_directory(&self, header: &WadHeader) -> Result<Vec<WadDirEntry>> {
        let offset = header.dir_offset as usize;
        let len = header.dir_count as usize * DIR_ENTRY_SIZE;
        self.check_span("directory", offset, len)?;

        let mut entries = Vec::with_capacity(header.dir_count as usize);
        for i in 0..header.dir_count as usize {
            let rec = offset + i * DIR_ENTRY_SIZE;
            entries.push(WadDirEntry::new(
                self.u32_at(rec),
                self.u32_at(rec + 4),
                self.name_at(rec + 8, 8),
            ));
        }
        Ok(entries)
    }
}

/// Find the first directory entry with the given name
pub fn find_lump<'a>(directory: &'a [WadDirEntry], name: &str) -> Option<&'a WadDirEntry> {
    directory.iter().find(|e| e.lump_name == name)
}

/// Which part of the decode an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    Header,
    Directory,
    MapGroups,
    Map,
    Playpal,
    Colormap,
    Textures,
    Dehacked,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DecodeStage::Header => "header",
            DecodeStage::Directory => "directory",
            DecodeStage::MapGroups => "map-groups",
            DecodeStage::Map => "map",
            DecodeStage::Playpal => "playpal",
            DecodeStage::Colormap => "colormap",
            DecodeStage::Textures => "textures",
            DecodeStage::Dehacked => "dehacked",
        };
        f.write_str(name)
    }
}

/// One progress report emitted by the orchestration while decoding
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: DecodeStage,
    pub detail: String,
}

/// Caller-supplied sink for progress events. The decoders themselves have
/// no notion of a UI; a host that wants live reporting implements this.
pub trait ProgressSink {
    fn progress(&mut self, event: ProgressEvent);
}

/// Sink that drops every event
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&mut self, _event: ProgressEvent) {}
}

fn report(sink: &mut dyn ProgressSink, stage: DecodeStage, detail: impl Into<String>) {
    let detail = detail.into();
    debug!("{stage}: {detail}");
    sink.progress(ProgressEvent { stage, detail });
}

/// Everything decoded from one source buffer, populated in dependency
/// order by [`WadAssets::decode`]. Each field is decoded once; absent
/// optional lumps stay `None`. The cache lives exactly as long as the
/// buffer it came from: decoding a different `WadData` means building a
/// new `WadAssets`.
#[derive(Debug, Default)]
pub struct WadAssets {
    pub header: Option<WadHeader>,
    pub directory: Option<Vec<WadDirEntry>>,
    pub map_groups: Option<Vec<WadMapGroup>>,
    pub maps: Option<Vec<WadMap>>,
    pub playpal: Option<WadPlaypal>,
    pub colormap: Option<WadColorMap>,
    pub textures: Option<WadTextures>,
    pub dehacked: Option<WadDehacked>,
    /// Isolated per-resource failures. Header/directory failures are
    /// fatal and returned from `decode` instead.
    pub errors: Vec<(DecodeStage, WadError)>,
}

impl WadAssets {
    /// Decode the whole WAD: header, directory, map groups, every map
    /// (honouring `options` for the heavy lumps), then the global
    /// resources. A failure in the header or directory aborts the decode;
    /// any other failure is recorded in `errors` and decoding continues.
    pub fn decode(
        wad: &WadData,
        options: &MapDecodeOptions,
        sink: &mut dyn ProgressSink,
    ) -> Result<WadAssets> {
        let mut assets = WadAssets::default();

        let header = wad.decode_header()?;
        report(sink, DecodeStage::Header, header.wad_type.as_str());
        assets.header = Some(header);

        let directory = wad.decode_directory(&header)?;
        report(
            sink,
            DecodeStage::Directory,
            format!("{} lumps", directory.len()),
        );

        let groups = decode_map_groups(&directory);
        report(sink, DecodeStage::MapGroups, format!("{} maps", groups.len()));

        let mut maps = Vec::with_capacity(groups.len());
        for group in &groups {
            report(sink, DecodeStage::Map, group.name.clone());
            maps.push(decode_map(wad, group, options));
        }
        assets.maps = Some(maps);
        assets.map_groups = Some(groups);

        match decode_playpal(wad, &directory) {
            Ok(Some(playpal)) => {
                report(
                    sink,
                    DecodeStage::Playpal,
                    format!("{} palettes", playpal.palettes.len()),
                );
                assets.playpal = Some(playpal);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("PLAYPAL failed: {e}");
                assets.errors.push((DecodeStage::Playpal, e));
            }
        }

        match decode_colormap(wad, &directory) {
            Ok(Some(colormap)) => {
                report(
                    sink,
                    DecodeStage::Colormap,
                    format!("{} tables", colormap.maps.len()),
                );
                assets.colormap = Some(colormap);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("COLORMAP failed: {e}");
                assets.errors.push((DecodeStage::Colormap, e));
            }
        }

        match decode_textures(wad, &directory) {
            Ok(Some(textures)) => {
                report(
                    sink,
                    DecodeStage::Textures,
                    format!(
                        "{} + {} textures, {} patches",
                        textures.texture1.len(),
                        textures.texture2.len(),
                        textures.patches.len()
                    ),
                );
                assets.textures = Some(textures);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("texture decode failed: {e}");
                assets.errors.push((DecodeStage::Textures, e));
            }
        }

        match decode_dehacked(wad, &directory) {
            Ok(Some(dehacked)) => {
                report(
                    sink,
                    DecodeStage::Dehacked,
                    format!("{} thing overrides", dehacked.things.len()),
                );
                assets.dehacked = Some(dehacked);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("DEHACKED failed: {e}");
                assets.errors.push((DecodeStage::Dehacked, e));
            }
        }

        assets.directory = Some(directory);
        Ok(assets)
    }
}
