//! Delimited-file reading for ironwood: turns raw rows into a validated
//! [`ironwood_id3::Dataset`].

mod error;
mod reader;

pub use error::IoError;
pub use reader::ExampleReader;
