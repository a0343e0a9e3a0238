pub mod jolpica;
pub mod schedule;
pub mod selector;
pub mod sessions;
