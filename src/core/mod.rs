pub mod analyzer;
pub mod classifier;
pub mod extract;
pub mod fetcher;
pub mod signals;
