// Service module exports

pub mod assignment;
pub mod index;
pub mod relocation;
pub mod settings;
pub mod store;
pub mod visibility;
