// Core pipeline exports
pub mod blocking;
pub mod classifier;
pub mod linker;
pub mod resolver;
pub mod similarity;

pub use blocking::{title_initial, BlockingIndex};
pub use classifier::{classify_threshold, classify_with_fallback, Classified, EmModel, FitError};
pub use linker::{LinkError, Linker};
pub use resolver::resolve;
pub use similarity::{jaro, jaro_winkler, score_pair};
