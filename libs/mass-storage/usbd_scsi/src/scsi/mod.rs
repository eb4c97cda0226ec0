pub mod commands;
pub mod responses;
pub mod enums;

mod error;
pub use error::Error;

mod scsi;
pub use scsi::{ActivityCallback, Scsi};

#[cfg(test)]
mod tests;
