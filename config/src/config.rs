use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::{Path, PathBuf}};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "WEAVE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub difficulty: u32,
    pub max_block_size: usize,
    pub mine_on_append: bool,
    pub max_mining_attempts: u64,
    /// 0 disables the deadline.
    pub mining_timeout_secs: u64,
}

impl Config {
    fn expand_path(path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        PathBuf::from(expanded.into_owned())
    }

    /// `$WEAVE_CONFIG` if set, otherwise `~/.weave/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Ok(Self::expand_path(&path));
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot find home directory"))?;
        Ok(home.join(".weave").join("config.json"))
    }

    /// Load the config, writing the defaults first when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::info!(
                "Configuration file not found. Creating default configuration: {:?}",
                path
            );
            let cfg = Self::default();
            cfg.save()?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {:?}", path))?;
        serde_json::from_str(&data).context("Configuration file format error")
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))
    }

    /// Parse `value` into the field named `key`. Does not persist.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "difficulty" => {
                let difficulty: u32 = parse(key, value)?;
                if difficulty > 64 {
                    bail!("difficulty must be between 0 and 64, got {}", difficulty);
                }
                self.difficulty = difficulty;
            }
            "max_block_size" => {
                let size: usize = parse(key, value)?;
                if size == 0 {
                    bail!("max_block_size must be positive");
                }
                self.max_block_size = size;
            }
            "mine_on_append" => self.mine_on_append = parse(key, value)?,
            "max_mining_attempts" => self.max_mining_attempts = parse(key, value)?,
            "mining_timeout_secs" => self.mining_timeout_secs = parse(key, value)?,
            _ => bail!("Unknown configuration key: {}", key),
        }
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()?;
        println!("{} = {} Set successfully.", key, value);
        Ok(())
    }

    pub fn view(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }

    pub fn init_default() -> Result<()> {
        let cfg = Self::default();
        cfg.save()?;
        println!(
            "Default configuration file has been created: {:?}",
            Self::default_path()?
        );
        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {}: {:?}", key, value))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: 4,
            max_block_size: 1024 * 1024,
            mine_on_append: true,
            max_mining_attempts: 10_000_000,
            mining_timeout_secs: 0,
        }
    }
}
