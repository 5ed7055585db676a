//! Profile management commands.

use super::common::{ProfileSource, load_profile};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use wpe_config::{
    Profile, default_profile_path, list_user_profiles, profile_name_from_path, user_config_dir,
    user_profiles_dir,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a profile with default settings
    Init {
        /// Destination (defaults to the user profile)
        path: Option<PathBuf>,

        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show a profile and check it
    Show {
        /// Profile name or path (defaults to the user profile)
        profile: Option<String>,
    },

    /// List named profiles
    List,

    /// Show config directories
    Paths,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Init { path, name, force } => {
            let path = path.unwrap_or_else(default_profile_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite.",
                    path.display()
                );
            }
            Profile::new(name).save(&path)?;
            println!("Wrote {}", path.display());
        }

        ConfigCommand::Show { profile } => {
            let (profile, source) = load_profile(profile.as_deref())?;
            match source {
                ProfileSource::File(path) => println!("# {}", path.display()),
                ProfileSource::Defaults => println!(
                    "# built-in defaults (no profile at {})",
                    default_profile_path().display()
                ),
            }
            print!("{}", profile.to_toml()?);

            match profile.validate() {
                Ok(()) => println!("\n# valid"),
                Err(e) => println!("\n# invalid: {e}"),
            }
        }

        ConfigCommand::List => {
            let profiles = list_user_profiles();
            if profiles.is_empty() {
                println!("No profiles in {}", user_profiles_dir().display());
            } else {
                println!("Profiles ({}):", user_profiles_dir().display());
                for path in profiles {
                    let name = profile_name_from_path(&path).unwrap_or_default();
                    match Profile::load(&path) {
                        Ok(p) => println!(
                            "  {name:<20} {} mic(s) -> {} output(s), order {}",
                            p.mic_num, p.out_num, p.order
                        ),
                        Err(e) => println!("  {name:<20} (unreadable: {e})"),
                    }
                }
            }
        }

        ConfigCommand::Paths => {
            println!("Config directory:   {}", user_config_dir().display());
            println!("Default profile:    {}", default_profile_path().display());
            println!("Profiles directory: {}", user_profiles_dir().display());
        }
    }

    Ok(())
}
