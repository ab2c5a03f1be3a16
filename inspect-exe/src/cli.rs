use argh::FromArgs;
use log::LevelFilter;
use wad::MapDecodeOptions;

/// Decode a WAD file and report what is in it
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<LevelFilter>,
    /// path to the WAD file to inspect
    #[argh(positional)]
    pub wad: String,
    /// only report the named map (e.g. E1M1, MAP01)
    #[argh(option)]
    pub map: Option<String>,
    /// decode the SEGS lump of each map
    #[argh(switch)]
    pub segments: bool,
    /// decode the SSECTORS lump of each map
    #[argh(switch)]
    pub subsectors: bool,
    /// decode the NODES lump of each map
    #[argh(switch)]
    pub nodes: bool,
    /// decode the REJECT lump of each map
    #[argh(switch)]
    pub reject: bool,
    /// decode the full per-cell BLOCKMAP line lists
    #[argh(switch)]
    pub blockmap: bool,
    /// decode every optional lump
    #[argh(switch)]
    pub all: bool,
    /// list the things of each reported map
    #[argh(switch)]
    pub things: bool,
}

impl CLIOptions {
    pub fn decode_options(&self) -> MapDecodeOptions {
        if self.all {
            return MapDecodeOptions::all();
        }
        MapDecodeOptions {
            segments: self.segments,
            subsectors: self.subsectors,
            nodes: self.nodes,
            reject: self.reject,
            blockmap_detail: self.blockmap,
        }
    }
}
