//! Level-dispatch routing
//!
//! A set of [`DispatchRule`]s becomes a [`DispatchCore`] that fans each record
//! out to the destinations whose severity set contains the record's level,
//! plus a [`ShutdownHandle`] that releases those destinations.

pub mod builder;
pub mod core;
pub mod level_filter;
pub mod rule;
pub mod shutdown;

pub use builder::{build_default_core, build_dispatch_core};
pub use self::core::{DispatchCore, SubCore};
pub use level_filter::LevelFilter;
pub use rule::{normalize_suffix, DispatchRule};
pub use shutdown::ShutdownHandle;
