pub mod config;
pub mod enrich;
pub mod models;
pub mod storage;
pub mod tracking;

pub mod api;
pub mod beacon;
