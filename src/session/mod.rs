//! Session state holder: endpoints, selection, settings and persistence.

pub mod application;
