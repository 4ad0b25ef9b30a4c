//! Assistant bridge: conversational turns and report summaries over a text-generation model.

pub mod application;
