// src/store/mod.rs

//! In-memory caches over the API.
//!
//! - `ApplicationStore`: the application list, kept in sync with CRUD calls
//! - `StatusTrackingStore`: histories per application id plus analytics
//! - `ResumeStore`: the user's resume with section contents and attachments

pub mod applications;
pub mod resume;
pub mod status_tracking;

pub use applications::{ApplicationFilter, ApplicationStore};
pub use resume::ResumeStore;
pub use status_tracking::{StatusTrackingStore, SuccessPredicate};
