pub mod fund;
pub mod operation;
pub mod profile;
pub mod projection;
pub mod rates;
pub mod rating;
pub mod solver;

use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use fidc_core::fund::FundSnapshot;
use fidc_core::profile::{JsonFileProfileStore, ProfileStore};
use fidc_core::with_metadata;

use crate::input;

pub const DEFAULT_PROFILES_FILE: &str = "fidc_profiles.json";

/// Where the fund snapshot comes from.
#[derive(Args)]
pub struct SnapshotArgs {
    /// Path to a JSON or YAML snapshot (takes precedence over --profile)
    #[arg(long)]
    pub input: Option<String>,

    /// Name of a saved profile to evaluate
    #[arg(long)]
    pub profile: Option<String>,

    /// Profile store file
    #[arg(long, default_value = DEFAULT_PROFILES_FILE)]
    pub profiles_file: String,
}

impl SnapshotArgs {
    /// File, then profile, then stdin; the default fund when none is given.
    pub fn load(&self) -> Result<FundSnapshot, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_input(path);
        }
        if let Some(ref name) = self.profile {
            let store = JsonFileProfileStore::new(&self.profiles_file);
            return Ok(store.load_required(name)?);
        }
        read_payload_or_default()
    }
}

/// Piped stdin when present, otherwise `T::default()`.
pub fn read_payload_or_default<T>() -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned + Default,
{
    match input::stdin::read_stdin()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => {
            info!("no input given, using defaults");
            Ok(T::default())
        }
    }
}

/// `--input` file, else stdin, else `T::default()`.
pub fn read_payload<T>(path: Option<&str>) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(p) => input::file::read_input(p),
        None => read_payload_or_default(),
    }
}

/// Wrap a bare engine result in the standard output envelope.
pub fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: Value,
    warnings: Vec<String>,
    start: Instant,
    result: T,
) -> Result<Value, Box<dyn std::error::Error>> {
    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, &assumptions, warnings, elapsed, result);
    Ok(serde_json::to_value(output)?)
}
