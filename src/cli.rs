use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{CONFIG_ENV, Overrides, Settings};
use crate::error::Result;
use crate::runtime;
use crate::service::render::Markup;

#[derive(Parser)]
#[command(name = "calendar-block")]
#[command(about = "Next Google Calendar event for an i3blocks/swaybar block", long_about = None)]
pub struct Cli {
    /// Config file path (default is $XDG_CONFIG_HOME/calendar-block/config.toml)
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for stored account tokens (default is CONFIG_DIR/access-tokens)
    #[arg(long = "access-tokens", global = true, value_name = "DIR")]
    pub access_tokens: Option<PathBuf>,

    /// OAuth client secret file, relative to the config directory
    #[arg(long, global = true, value_name = "FILE")]
    pub creds: Option<PathBuf>,

    /// Output markup, overrides `markup` in the config
    #[arg(long, global = true, value_enum)]
    pub markup: Option<Markup>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Authorize a Google account and add it to the config
    Register,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            access_tokens: self.access_tokens.clone(),
            creds: self.creds.clone(),
            markup: self.markup,
        }
    }
}

pub async fn cli(cli: Cli) -> Result<()> {
    let overrides = cli.overrides();
    match cli.command {
        None => {
            let settings = Settings::load(&overrides, true)?;
            let line = runtime::run_status(&settings).await?;
            println!("{}", line);
        }
        Some(Commands::Register) => {
            let mut settings = Settings::load(&overrides, false)?;
            let path = runtime::run_register(&mut settings).await?;
            println!("Saving credential file to: {}", path.display());
            println!("Registered in {}", settings.config_path.display());
        }
    }
    Ok(())
}
