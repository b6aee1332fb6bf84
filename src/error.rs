use thiserror::Error;

use crate::browser::DriverError;
use crate::feed::FeedError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ClapperError {
    #[error("Login was abandoned before the session was authenticated")]
    LoginAbandoned,

    #[error("Could not read the logged-in display name from the account page")]
    DisplayNameMissing,

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Browser error: {0}")]
    Driver(#[from] DriverError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
