//! # Test Factories
//!
//! Builders for publisher test data on top of the in-memory repository.
//!
//! [`PublisherWorld`] sets up one partner organization with a permission
//! group, a user per workflow role and a service wired to an in-memory
//! outbox. [`CourseFactory`] and [`CourseRunFactory`] start from records that
//! pass the review checklist; `without_*` methods knock individual fields out.

pub mod records;
pub mod world;

pub use records::{CourseFactory, CourseRunFactory};
pub use world::PublisherWorld;
