pub mod config;
pub mod constants;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod progress;
pub mod recognition;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod view_state;
pub mod workers;
