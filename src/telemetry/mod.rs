//! Synthetic telemetry: metric sampling, fleet layout and snapshot assembly.

pub mod application;
