//! DEHACKED game-balance override text.
//!
//! The lump is free text: blocks of `key = value` lines separated by
//! blank lines, with a declaration line like `Thing 12 (Zombieman)` at
//! the top of each block. Only Thing blocks with a resolvable type code
//! and display name matter here; everything else in the file describes
//! state this decoder has no use for and is skipped without complaint.

use crate::error::Result;
use crate::things::ThingGroup;
use crate::types::WadDirEntry;
use crate::wad::{find_lump, WadData};

/// One parsed Thing override: the type code it applies to, the display
/// name from the declaration line, and the category inferred from the
/// block's `bits` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DehackedThing {
    pub kind: i16,
    pub name: String,
    pub group: ThingGroup,
}

/// The decoded DEHACKED lump: the raw text and the Thing overrides
/// recovered from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadDehacked {
    pub text: String,
    pub things: Vec<DehackedThing>,
}

impl WadDehacked {
    pub fn thing_for(&self, kind: i16) -> Option<&DehackedThing> {
        self.things.iter().find(|t| t.kind == kind)
    }
}

/// Decode the DEHACKED lump. `None` when absent.
pub fn decode_dehacked(wad: &WadData, directory: &[WadDirEntry]) -> Result<Option<WadDehacked>> {
    let Some(entry) = find_lump(directory, "DEHACKED") else {
        return Ok(None);
    };
    let (offset, len) = wad.lump_span(entry)?;
    // 8-bit characters, not UTF-8
    let text: String = wad.bytes_at(offset, len).iter().map(|&b| b as char).collect();
    let things = parse_overrides(&text);
    Ok(Some(WadDehacked { text, things }))
}

/// Split the text into blank-line-separated blocks and parse each Thing
/// block. Blocks missing a type code or a parenthesized name are
/// discarded, not errors.
pub fn parse_overrides(text: &str) -> Vec<DehackedThing> {
    let mut things = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if let Some(thing) = parse_block(&block) {
                things.push(thing);
            }
            block.clear();
        } else {
            block.push(line);
        }
    }
    if let Some(thing) = parse_block(&block) {
        things.push(thing);
    }
    things
}

fn parse_block(lines: &[&str]) -> Option<DehackedThing> {
    let first = lines.first()?;
    let mut tokens = first.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("thing") {
        return None;
    }
    let kind: i16 = tokens.next()?.parse().ok()?;

    let open = first.find('(')?;
    let close = first[open..].find(')')? + open;
    let name = first[open + 1..close].trim().to_string();
    if name.is_empty() {
        return None;
    }

    let group = lines
        .iter()
        .find(|l| l.contains("bits = "))
        .map_or(ThingGroup::Unknown, |l| {
            if l.to_uppercase().contains("COUNTKILL") {
                ThingGroup::Monster
            } else {
                ThingGroup::Unknown
            }
        });

    Some(DehackedThing { kind, name, group })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Patch File for DeHackEd v3.0\n\
        \n\
        Thing 3004 (Former Human)\n\
        Hit points = 40\n\
        bits = SOLID+SHOOTABLE+COUNTKILL\n\
        \n\
        Thing 2014 (Health Bonus)\n\
        bits = SPECIAL\n\
        \n\
        Thing 12\n\
        Hit points = 9\n\
        \n\
        Frame 185\n\
        Duration = 4\n";

    #[test]
    fn parses_thing_blocks_only() {
        let things = parse_overrides(SAMPLE);
        assert_eq!(things.len(), 2);
        assert_eq!(things[0].kind, 3004);
        assert_eq!(things[0].name, "Former Human");
        assert_eq!(things[0].group, ThingGroup::Monster);
        assert_eq!(things[1].kind, 2014);
        assert_eq!(things[1].name, "Health Bonus");
        assert_eq!(things[1].group, ThingGroup::Unknown);
    }

    #[test]
    fn trailing_block_without_blank_line_is_flushed() {
        let things = parse_overrides("Thing 7 (Spider)\nbits = COUNTKILL");
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].group, ThingGroup::Monster);
    }

    #[test]
    fn nameless_or_codeless_blocks_are_discarded() {
        assert!(parse_overrides("Thing 12\nHit points = 9").is_empty());
        assert!(parse_overrides("Thing x (Broken)").is_empty());
        assert!(parse_overrides("Thing 12 ()").is_empty());
    }

    #[test]
    fn decode_reads_lump_as_latin_text() {
        let text = b"Thing 16 (Cyberdemon)\nbits = COUNTKILL\n";
        let mut buf = vec![0u8; 4];
        buf.extend_from_slice(text);
        let wad = WadData::from_bytes("d", buf);
        let dir = vec![WadDirEntry::new(4, text.len() as u32, "DEHACKED".to_string())];
        let deh = decode_dehacked(&wad, &dir).unwrap().unwrap();
        assert_eq!(deh.things.len(), 1);
        assert_eq!(deh.thing_for(16).unwrap().name, "Cyberdemon");
        assert!(deh.thing_for(99).is_none());
    }
}
