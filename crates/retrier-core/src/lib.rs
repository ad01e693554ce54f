pub mod config;
pub mod logging;

pub mod clock;
pub mod timing;
pub mod retry;
