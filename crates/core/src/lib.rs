//! # Planner Core
//!
//! Domain types shared by the database and API crates: the error taxonomy,
//! request/response models, and the small pieces of pure logic that every
//! layer agrees on (ownership checks, event timestamps, file intake and the
//! notification contract).

pub mod authz;
pub mod credentials;
pub mod errors;
pub mod files;
pub mod models;
pub mod notify;
pub mod schedule;
