pub mod notifier;

pub use notifier::{MessageId, NotifierPlugin};
