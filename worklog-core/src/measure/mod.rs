//! Measurement classifiers: language detection and line counting.
//!
//! Both are stateless and feed the edit recorder; neither touches the
//! store.

pub mod language;
pub mod lines;

pub use language::detect_language;
pub use lines::count_lines;
