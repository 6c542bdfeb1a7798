use thiserror::Error;

use tooxoot_core::auth::claims::ClaimsError;
use tooxoot_core::auth::jwt::TokenError;
use tooxoot_core::auth::keys::KeyError;
use tooxoot_core::auth::password::PasswordError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Json: {}", .0)]
    Json(#[from] serde_json::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("{}", .0)]
    Key(#[from] KeyError),

    #[error("{}", .0)]
    Token(#[from] TokenError),

    #[error("{}", .0)]
    Claims(#[from] ClaimsError),

    #[error("{}", .0)]
    Password(#[from] PasswordError),
}
