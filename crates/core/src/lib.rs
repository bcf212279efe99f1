//! # Salon Core
//!
//! Domain layer of the salon booking service: appointment and schedule models,
//! the error taxonomy, free-slot computation and the appointment lifecycle.
//!
//! Persistence and messaging are reached through the traits in [`store`] and
//! [`notify`], so the same [`booking::BookingService`] runs against PostgreSQL
//! in production and against [`store::memory::InMemoryStore`] in tests.

pub mod booking;
pub mod clock;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod slots;
pub mod store;
