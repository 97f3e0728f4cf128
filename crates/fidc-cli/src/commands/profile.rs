use clap::{Args, Subcommand};
use serde_json::{json, Value};

use fidc_core::fund::FundSnapshot;
use fidc_core::profile::{JsonFileProfileStore, ProfileStore};

use super::{read_payload, DEFAULT_PROFILES_FILE};

/// Arguments for profile management
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,

    /// Profile store file
    #[arg(long, global = true, default_value = DEFAULT_PROFILES_FILE)]
    pub profiles_file: String,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Save a snapshot (from --input or stdin) under a name, replacing any existing one
    Save {
        name: String,
        #[arg(long)]
        input: Option<String>,
    },
    /// Print a saved snapshot
    Load { name: String },
    /// Remove a saved snapshot
    Delete { name: String },
    /// List saved profiles
    List,
}

pub fn run_profile(args: ProfileArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileProfileStore::new(&args.profiles_file);
    match args.action {
        ProfileAction::Save { name, input } => {
            let snapshot: FundSnapshot = read_payload(input.as_deref())?;
            store.save(&name, &snapshot)?;
            Ok(json!({ "saved": name, "path": store.path().display().to_string() }))
        }
        ProfileAction::Load { name } => Ok(serde_json::to_value(store.load_required(&name)?)?),
        ProfileAction::Delete { name } => {
            let deleted = store.delete(&name)?;
            if !deleted {
                return Err(format!("Profile not found: {name}").into());
            }
            Ok(json!({ "deleted": name }))
        }
        ProfileAction::List => Ok(serde_json::to_value(store.list()?)?),
    }
}
