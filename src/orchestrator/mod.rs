//! 오케스트레이션 계층
//!
//! ## 모듈 구성
//!
//! ### `crawl_app` - 크롤링 실행 전체
//! - 브라우저 세션 소유 (열기, 로그인, 모든 종료 경로에서 닫기)
//! - 대상 목록 실행 후 CSV 내보내기
//! - 전체 통계 출력
//!
//! ### `target_processor` - 대상 하나 처리
//! - 강의 검색 -> 강의별 수강평 추출 -> ReviewRecord 누적
//! - 대상 단위 실패 격리와 지수 백오프 재시도
//!
//! ## 계층 관계
//!
//! ```text
//! crawl_app (Vec<Target>, 세션 소유)
//!     ↓
//! target_processor (Target 하나)
//!     ↓
//! services (검색 / 추출 / 스크롤 / 내보내기)
//!     ↓
//! infrastructure (PageReader, JsExecutor)
//! ```

pub mod crawl_app;
pub mod target_processor;

pub use crawl_app::App;
pub use target_processor::{CrawlReport, RetryPolicy, TargetOutcome, TargetProcessor, TargetStatus};
