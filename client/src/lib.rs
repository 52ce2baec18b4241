//! Client-side view of the portal: a local mirror of the signed-in user's
//! club subscriptions plus the reconciled membership read.
//!
//! Failures never surface as errors here. They are logged and turned into
//! `false` or an empty collection, and callers recover by calling again.

mod backend;
mod http;
mod memberships;
mod store;

pub use backend::*;
pub use http::*;
pub use memberships::*;
pub use store::*;

pub use shared;
