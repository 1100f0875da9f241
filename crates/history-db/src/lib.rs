//! History DB - Persistence of reduced change timelines
//!
//! This crate stores the output of a run in a local Sled database: change
//! events laid out so a prefix scan on an entity key returns its history in
//! order, plus a small log of completed runs.

mod database;

pub use database::{RunRecord, TimelineDb};
