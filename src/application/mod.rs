// Application layer - Ports and use cases over the metrics backend
pub mod aggregate_service;
pub mod config_service;
pub mod dashboard_state;
pub mod gateway;
pub mod loading;
pub mod notifier;
pub mod port_store;
pub mod refresh_scheduler;
pub mod script_service;
pub mod transport;

#[cfg(test)]
pub mod testing;
