pub mod drill;
pub mod result;
pub mod ticker;
pub mod timer;
