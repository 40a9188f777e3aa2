use std::path::PathBuf;

/// Locations of the on-disk index state.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_path: PathBuf,
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.base_path.join("marquee.redb")
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_path.join("config.toml")
    }
}
