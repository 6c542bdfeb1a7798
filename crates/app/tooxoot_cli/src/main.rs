// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::fs;

use clap::Parser;
use cli::{Cli, Commands};
use tooxoot_core::auth::claims::Claims;
use tooxoot_core::auth::jwt::TokenSigner;
use tooxoot_core::auth::password::hash_password;
use tooxoot_core::clock::SystemClock;
use tooxoot_core::config::AuthConfig;

mod cli;
mod logging;

fn main() -> Result<()> {
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
        Commands::Sign { id } => {
            let signer = load_signer(&args)?;
            let claims = Claims::new(id, &SystemClock)
                .ok_or_else(|| Error::Custom("empty id".to_string()))?;
            let token = signer.sign(&claims)?;
            log::info!("issued token for '{}' expiring at {}", claims.id, claims.exp);
            println!("{token}");
        }
        Commands::Verify { token } => {
            let signer = load_signer(&args)?;
            let claims = signer.parse(token)?;
            claims.validate(&SystemClock)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::HashPassword { password } => {
            println!("{}", hash_password(password, args.hash_cost)?);
        }
    }

    Ok(())
}

/// Build the signer once from the key file or the `RSAKEY` value.
fn load_signer(args: &Cli) -> Result<TokenSigner> {
    let rsa_key = match &args.rsa_key_file {
        Some(path) => {
            log::debug!("reading signing key from {}", path.display());
            fs::read_to_string(path)?
        }
        None => args.rsa_key.clone().unwrap_or_default(),
    };

    Ok(AuthConfig::new(rsa_key, args.hash_cost).signer()?)
}
