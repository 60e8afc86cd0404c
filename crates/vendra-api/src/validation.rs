use std::sync::OnceLock;

use regex::Regex;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

fn email_pattern() -> &'static Regex {
    static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("email regex pattern must be valid")
    })
}

/// Check the minimal `local@domain.tld` shape. The address is not
/// normalized; case and surrounding text are significant.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email_pattern().is_match(email) {
        Ok(())
    } else {
        Err(INVALID_EMAIL_MESSAGE)
    }
}
