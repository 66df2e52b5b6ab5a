pub mod entries;
pub mod handlers;
pub mod lenient;
pub mod models;
pub mod modules;
pub mod mutation;
pub mod persistence;
pub mod seed;
pub mod snapshot;
pub mod store;
