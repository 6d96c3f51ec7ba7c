//! Row models and DTOs.

pub mod notification;
pub mod ticket;
pub mod user;
