//! SeaORM entities.

pub mod complaints;
pub mod polls;
pub mod users;
pub mod votes;
