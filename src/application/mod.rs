// Application layer - Loading, caching and rendering use cases
pub mod dashboard_service;
pub mod range_loader;
pub mod retry;
pub mod sheet_repository;
pub mod table_cache;
pub mod view_renderer;

#[cfg(test)]
pub(crate) mod fakes;
