// Model exports
pub mod domain;
pub mod options;

pub use domain::{
    Assignment, CandidatePair, ClassifierMode, LinkReport, LinkedRecord, Listing, MatchCandidate,
    MatchMode, ResolutionPolicy, ScoredPair,
};
pub use options::{BlockKeyFn, LinkOptions};
