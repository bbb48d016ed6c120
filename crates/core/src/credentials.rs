use rand::distributions::{Alphanumeric, DistString};

/// Length of passwords generated by the forgot-password flow.
pub const GENERATED_PASSWORD_LEN: usize = 10;

/// Generates a random alphanumeric password.
pub fn generate_password(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

/// Emails are stored trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
