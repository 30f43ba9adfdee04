pub mod publisher_service;

pub use publisher_service::{PublisherService, ServiceOutcome};
