//! `mockall` doubles for the repository traits, re-exported for the API tests.

pub mod repositories {
    pub use crate::repositories::{MockEventRepository, MockUserRepository};
}
