//! # Decoding of WAD files
//!
//! A WAD ("Where's All the Data") is a single binary blob: a 12-byte
//! header, a run of lumps, and a directory describing where each lump
//! lives. Everything in here decodes slices of that one buffer; nothing
//! ever mutates it.
//!
//! ```ignore
//!                        <───── 32 bits ─────>
//!             ┌─────────┬───────────────────────┐
//!      Header │ 0x00-03 │ Magic ("IWAD"/"PWAD") │
//!             │ 0x04-07 │ Directory entry count │
//!             │ 0x08-0B │ Directory offset ─────┼──┐
//!             ├─────────┴───────────────────────┤  │
//!       Lumps │ E1M1 marker, THINGS, LINEDEFS,  │  │
//!             │ VERTEXES, ... PLAYPAL, PNAMES,  │  │
//!             │ TEXTURE1, patch images, ...     │  │
//!             ├─────────────────────────────────┤<─┘
//!   Directory │ 16 bytes per entry:             │
//!             │ lump offset, lump size,         │
//!             │ 8-byte NUL-padded lump name     │
//!             └─────────────────────────────────┘
//! ```
//!
//! All multi-byte integers are little-endian. Directory order is
//! load-bearing: a map is a marker entry followed by a fixed run of
//! per-map lumps, so [`decode_map_groups`] walks entries in file order.
//!
//! The usual entry point is [`WadAssets::decode`], which runs the whole
//! pipeline (header, directory, map groups, maps, global resources) and
//! caches the results. The individual `decode_*` functions are public for
//! callers that only want one piece.

mod colors;
mod dehacked;
mod error;
mod iterators;
mod map;
mod nodes;
mod textures;
mod things;
mod types;
mod wad;

pub use colors::{decode_colormap, decode_playpal, COLORMAP_COUNT, PALETTE_COUNT};
pub use dehacked::{decode_dehacked, parse_overrides, DehackedThing, WadDehacked};
pub use error::{Magic, Result, WadError};
pub use iterators::{LumpIter, NO_SIDEDEF};
pub use map::{
    decode_blockmap, decode_map, decode_map_groups, decode_reject, is_map_lump, LumpState,
    MapDecodeOptions, MapLump, MapThing, WadMap, WadMapGroup,
};
pub use nodes::{NodeChild, WadNode, IS_SSECTOR_MASK};
pub use textures::{decode_patch, decode_pnames, decode_texture_lump, decode_textures};
pub use things::{group_of, lookup, name_of, ThingGroup, ThingInfo, THING_INFO};
pub use types::*;
pub use wad::{
    find_lump, DecodeStage, NullSink, ProgressEvent, ProgressSink, WadAssets, WadData,
    DIR_ENTRY_SIZE, HEADER_SIZE,
};
