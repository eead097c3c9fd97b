//! Data models for the offline location queue.

mod location;
mod policy;

pub use location::*;
pub use policy::*;
