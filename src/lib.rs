// src/lib.rs

//! Job application tracker client library.
//!
//! Talks to the tracking service, keeps the signed-in session alive and
//! turns raw status history and trend rows into normalized timelines and
//! per-day aggregates.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod store;
pub mod utils;

pub use error::{AppError, Result};
