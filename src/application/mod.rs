// Application layer - Discovery, reconciliation and the use cases built on them
pub mod classifier;
pub mod hierarchy_resolver;
pub mod imputer;
pub mod map_builder;
pub mod map_store;
pub mod monitoring_repository;
pub mod patterns;
pub mod plant_data_service;
pub mod reconciler;
pub mod signal_extractor;

#[cfg(test)]
pub mod testing;
