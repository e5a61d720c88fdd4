pub mod api_client;
pub mod checks;
pub mod configuration;
pub mod domain;
pub mod fixture;
pub mod payloads;
pub mod suite;
pub mod telemetry;
