pub mod dry_run;
pub mod email;

pub use dry_run::DryRunNotifier;
pub use email::{EmailMessage, EmailNotifier};
