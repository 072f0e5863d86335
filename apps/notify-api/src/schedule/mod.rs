pub mod matcher;
pub mod target;
