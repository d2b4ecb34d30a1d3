pub mod packing;
pub mod trip;
pub mod user;
