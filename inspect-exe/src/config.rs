//! User configuration options.

use crate::{CLIOptions, BASE_DIR};
use dirs::config_dir;
use log::{error, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> PathBuf {
    let mut dir =
        config_dir().unwrap_or_else(|| panic!("{}: Couldn't open user config dir", LOG_TAG));
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir(&dir)
            .unwrap_or_else(|e| panic!("{}: Couldn't create {:?}: {}", LOG_TAG, dir, e));
    }
    dir.push("user.toml");
    dir
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub verbose: String,
    pub segments: bool,
    pub subsectors: bool,
    pub nodes: bool,
    pub reject: bool,
    pub blockmap: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            verbose: "warn".to_string(),
            segments: false,
            subsectors: false,
            nodes: false,
            reject: false,
            blockmap: false,
        }
    }
}

impl UserConfig {
    /// `load` will attempt to read the config, and panic if errored
    pub fn load() -> Self {
        let path = get_cfg_file();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.clone())
            .unwrap_or_else(|e| panic!("Couldn't open {:?}, {}", path, e));
        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file);
            } else {
                if let Ok(data) = toml::from_str(&buf) {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return data;
                }
                warn!("Could not deserialise {:?} recreating config", path);
            }
        }
        UserConfig::create_default(&mut file)
    }

    fn create_default(file: &mut File) -> Self {
        let config = UserConfig::default();
        info!("Created default user config file");
        // Should be okay to unwrap this as is since it is a Default
        let data = toml::to_string(&config).unwrap();
        file.write_all(data.as_bytes())
            .unwrap_or_else(|_| panic!("Could not write {:?}", get_cfg_file()));
        info!("Saved user config to {:?}", get_cfg_file());
        config
    }

    pub fn write(&self) {
        let mut file = File::create(get_cfg_file()).expect("Couldn't overwrite config");
        let data = toml::to_string_pretty(self).expect("Serialise config failed");
        file.write_all(data.as_bytes())
            .unwrap_or_else(|err| error!("Could not write config: {}", err));
    }

    /// Sync the CLI options and UserConfig with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!("Checking CLI options");

        if let Some(level) = cli.verbose {
            let level = level.to_string().to_lowercase();
            if level != self.verbose {
                self.verbose = level;
            }
        } else {
            cli.verbose = LevelFilter::from_str(&self.verbose).ok();
        }

        if cli.segments && !self.segments {
            self.segments = true;
        } else if !cli.segments {
            cli.segments = self.segments;
        }

        if cli.subsectors && !self.subsectors {
            self.subsectors = true;
        } else if !cli.subsectors {
            cli.subsectors = self.subsectors;
        }

        if cli.nodes && !self.nodes {
            self.nodes = true;
        } else if !cli.nodes {
            cli.nodes = self.nodes;
        }

        if cli.reject && !self.reject {
            self.reject = true;
        } else if !cli.reject {
            cli.reject = self.reject;
        }

        if cli.blockmap && !self.blockmap {
            self.blockmap = true;
        } else if !cli.blockmap {
            cli.blockmap = self.blockmap;
        }
    }
}
