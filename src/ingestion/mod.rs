pub mod normalizer;

pub use normalizer::{normalize, normalize_batch};
