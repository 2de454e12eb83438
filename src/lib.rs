#![doc = include_str!("../README.md")]

mod client;
mod client_info;
mod constants;
mod errors;
mod io;
pub mod native;
mod query;

pub use client::*;
pub use errors::*;
pub use io::{ClickHouseRead, ClickHouseWrite};
pub use native::block::Block;
pub use native::block_info::BlockInfo;
pub use native::column::{Column, ColumnType};
pub use native::progress::Progress;
pub use native::protocol::{Profile, ServerInfo};
pub use native::values::{Date, DateTime};
pub use query::QueryEvents;

/// Re-exports
///
/// Exporting external modules used in the public API of the library.
pub use reexports::*;
mod reexports {
    pub use chrono_tz::Tz;
    pub use tracing;
}
