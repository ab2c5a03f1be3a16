//! Command-line WAD inspector: decodes a file with the `wad` crate and
//! prints a per-map and per-resource report.

mod cli;
mod config;

use std::error::Error;

use log::{info, LevelFilter};
use simplelog::TermLogger;

use cli::CLIOptions;
use config::UserConfig;
use wad::{LumpState, ProgressEvent, ProgressSink, WadAssets, WadData, WadMap};

const BASE_DIR: &str = "wadinspect/";

/// Forwards decode progress to the logger so long decodes show activity
struct LogSink;

impl ProgressSink for LogSink {
    fn progress(&mut self, event: ProgressEvent) {
        info!(target: "decode", "{}: {}", event.stage, event.detail);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    // The config must resolve before the logger exists so a verbose
    // level stored in user.toml controls the active logger; log calls
    // made during the load itself are no-ops.
    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    user_config.write();

    TermLogger::init(
        options.verbose.unwrap_or(LevelFilter::Warn),
        simplelog::ConfigBuilder::default()
            .set_time_level(LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let wad = WadData::new(options.wad.as_str())?;
    let assets = WadAssets::decode(&wad, &options.decode_options(), &mut LogSink)?;

    report(&wad, &assets, &options);
    Ok(())
}

fn count<T>(state: &LumpState<Vec<T>>) -> String {
    match state {
        LumpState::Decoded(items) => items.len().to_string(),
        LumpState::Skipped => "skipped".to_string(),
        LumpState::Absent => "absent".to_string(),
        LumpState::Failed(e) => format!("FAILED ({e})"),
    }
}

fn report(wad: &WadData, assets: &WadAssets, options: &CLIOptions) {
    if let Some(header) = &assets.header {
        println!("{}: {}, {} lumps", wad.name(), header.wad_type.as_str(), header.dir_count);
    }

    for map in assets.maps.iter().flatten() {
        if let Some(only) = &options.map {
            if !map.name.eq_ignore_ascii_case(only) {
                continue;
            }
        }
        report_map(map, options.things);
    }

    match &assets.playpal {
        Some(playpal) => println!("PLAYPAL: {} palettes", playpal.palettes.len()),
        None => println!("PLAYPAL: absent"),
    }
    match &assets.colormap {
        Some(colormap) => println!("COLORMAP: {} tables", colormap.maps.len()),
        None => println!("COLORMAP: absent"),
    }
    match &assets.textures {
        Some(textures) => println!(
            "Textures: {} + {}, {} patch names, {} patch images",
            textures.texture1.len(),
            textures.texture2.len(),
            textures.patch_names.len(),
            textures.patches.len()
        ),
        None => println!("Textures: absent"),
    }
    match &assets.dehacked {
        Some(dehacked) => println!("DEHACKED: {} thing overrides", dehacked.things.len()),
        None => println!("DEHACKED: absent"),
    }

    for (stage, error) in &assets.errors {
        println!("ERROR in {stage}: {error}");
    }
}

fn report_map(map: &WadMap, list_things: bool) {
    println!("\n{}", map.name);
    println!("  things:     {}", count(&map.things));
    println!("  vertexes:   {}", count(&map.vertexes));
    println!("  linedefs:   {}", count(&map.linedefs));
    println!("  sidedefs:   {}", count(&map.sidedefs));
    println!("  sectors:    {}", count(&map.sectors));
    println!("  segments:   {}", count(&map.segments));
    println!("  subsectors: {}", count(&map.subsectors));
    println!("  nodes:      {}", count(&map.nodes));

    match &map.reject {
        LumpState::Decoded(table) => {
            println!("  reject:     {0}x{0} matrix", table.sector_count())
        }
        LumpState::Skipped => println!("  reject:     skipped"),
        LumpState::Absent => println!("  reject:     absent"),
        LumpState::Failed(e) => println!("  reject:     FAILED ({e})"),
    }
    match &map.blockmap {
        LumpState::Decoded(bm) => println!(
            "  blockmap:   {}x{} cells at ({}, {}){}",
            bm.columns,
            bm.rows,
            bm.x_origin,
            bm.y_origin,
            if bm.cell_lines.is_some() { "" } else { " (header only)" }
        ),
        LumpState::Skipped => println!("  blockmap:   skipped"),
        LumpState::Absent => println!("  blockmap:   absent"),
        LumpState::Failed(e) => println!("  blockmap:   FAILED ({e})"),
    }
    if let Some((min, max)) = &map.bounds {
        println!("  bounds:     ({}, {}) to ({}, {})", min.x, min.y, max.x, max.y);
    }

    if list_things {
        if let LumpState::Decoded(things) = &map.things {
            for t in things {
                println!(
                    "    {} [{}] at ({}, {}) angle {}",
                    t.name,
                    t.group.as_str(),
                    t.thing.x,
                    t.thing.y,
                    t.thing.angle
                );
            }
        }
    }
}
