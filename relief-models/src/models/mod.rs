//! Entity model definitions.

pub mod campaign;
pub mod donation;
pub mod proof;
pub mod user;
pub mod stats;
pub mod page;
pub mod health;
