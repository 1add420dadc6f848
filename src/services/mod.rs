pub mod export;
pub mod lecture_search;
pub mod review_extractor;
pub mod scroll;

pub use export::{export_reviews, read_reviews, write_reviews};
pub use lecture_search::LectureSearch;
pub use review_extractor::ReviewExtractor;
pub use scroll::{prescroll, stabilize, ScrollSettings, StabilizeOutcome};
