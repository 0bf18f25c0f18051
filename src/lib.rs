pub mod compiler;
pub mod dsl;
pub mod matcher;
pub mod repository;
pub mod schedule;
pub mod workflow;
