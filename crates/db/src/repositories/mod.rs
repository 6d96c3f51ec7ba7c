//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod notification_repo;
pub mod preference_repo;
pub mod ticket_repo;

pub use notification_repo::NotificationRepo;
pub use preference_repo::NotificationPreferenceRepo;
pub use ticket_repo::TicketRepo;
