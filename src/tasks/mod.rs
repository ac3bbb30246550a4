//! Background Tasks Module
//!
//! Contains the work the store hands off its callers' threads.
//!
//! # Tasks
//! - Maintenance: drops removed entries and runs the removal listener

mod maintenance;

pub use maintenance::{MaintenancePool, RemovalCause, RemovalListener, RemovalNotification};
