//! SQLite data access for dancers, dances and preferences.
//!
//! Tables: `dancers(id, name, active, type)`, `dances(id, active, name,
//! note)`, `positions(position, name, dance)` and
//! `dancerposition(dancer, position, dance, preference)`. Role and
//! preference columns hold the integer codes of [`Role`](crate::roster::Role)
//! and [`Preference`](crate::roster::Preference).

mod error;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::Store;
