//! Threshold alerts derived from snapshots.

pub mod application;
