use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

const ENV_PREFIX: &str = "APP";
const NESTING_SEPARATOR: &str = "__";

/// Settings read from `APP_`-prefixed variables, one `__` per nesting level
/// (`APP_DATABASE__URL` sets `database.url`). Keys the environment leaves out
/// keep their `Default` values.
pub trait EnvConfig: Sized + Default + Serialize + DeserializeOwned {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_env() -> Result<Self> {
        load_dotenv();
        Self::load(None)
    }

    /// Same as `from_env`, but reads `vars` instead of the process
    /// environment and skips `.env` files.
    fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Some(vars))
    }

    fn load(vars: Option<config_rs::Map<String, String>>) -> Result<Self> {
        let defaults = config_rs::Config::try_from(&Self::default())
            .context("failed to encode config defaults")?;

        let settings = config_rs::Config::builder()
            .add_source(defaults)
            .add_source(
                config_rs::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(NESTING_SEPARATOR)
                    .try_parsing(true)
                    .source(vars),
            )
            .build()
            .context("failed to read environment variables for config")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into config")?;

        cfg.validate()?;
        Ok(cfg)
    }
}

// crate root first, then the working directory
fn load_dotenv() {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());
}
