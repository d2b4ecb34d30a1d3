pub mod advisor;
pub mod editor;
pub mod gemini;
pub mod generator;
pub mod identity;
pub mod repository;
pub mod trips;
