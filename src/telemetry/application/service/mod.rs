pub mod metric_factory;
pub mod snapshot_builder;
pub mod snapshot_source;
pub mod topology_generator;
