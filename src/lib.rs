pub mod classifier;
pub mod gameweek;
pub mod markets;
pub mod match_result;
pub mod normalize;
pub mod report_export;

pub use classifier::{Classification, classify};
pub use match_result::MatchResult;
pub use normalize::normalize;
