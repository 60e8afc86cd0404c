pub mod dispatch;
pub mod error;
pub mod notifier;
pub mod rate_limit;
pub mod signup;
pub mod store;
pub mod validation;
pub mod waitlist;

#[cfg(test)]
mod testing;
