//! Types exchanged between the portal API and its clients.
//!
//! With the `sqlx` feature enabled the row types also decode straight from
//! the SQLite tables the API owns.

mod club;
mod membership;
mod subscription;

pub use club::*;
pub use membership::*;
pub use subscription::*;
