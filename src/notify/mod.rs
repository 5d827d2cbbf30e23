pub mod formatters;
pub mod notifier;

pub use notifier::{Digest, Notifier};
