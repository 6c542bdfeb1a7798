use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tooxoot_core::auth::password::{MAX_COST, MIN_COST};

/// Issue and verify tooxoot identity tokens.
#[derive(Parser, Debug)]
#[command(name = "tooxoot", version, about)]
pub struct Cli {
    /// PEM-encoded PKCS#1 RSA private key file. Takes precedence over `RSAKEY`.
    #[arg(long, global = true)]
    pub rsa_key_file: Option<PathBuf>,

    /// PEM-encoded PKCS#1 RSA private key.
    #[arg(long, global = true, env = "RSAKEY", hide_env_values = true)]
    pub rsa_key: Option<String>,

    /// bcrypt cost factor for password hashing (4 to 31).
    #[arg(
        long,
        global = true,
        env = "TOOXOOT_HASH_COST",
        default_value_t = MIN_COST,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_COST)..=i64::from(MAX_COST))
    )]
    pub hash_cost: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Issue a signed token for an identity.
    Sign {
        /// Identity to assert.
        #[arg(long)]
        id: String,
    },

    /// Verify a token and print its claims.
    Verify {
        token: String,
    },

    /// Print the bcrypt hash of a password.
    HashPassword {
        password: String,
    },
}
