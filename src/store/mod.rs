//! 영구 저장소 계층
//!
//! 내보낸 CSV 를 SQLite 의 `courses` / `course_reviews` 테이블로 병합한다.
//! 테이블 생성은 별도 초기화 도구의 몫이다.

pub mod artifact;
pub mod merge;
pub mod review_store;

pub use artifact::{read_artifact, ArtifactRow};
pub use merge::{MergeOptions, MergeReport, DEFAULT_TOTAL_STUDENTS};
pub use review_store::ReviewStore;
