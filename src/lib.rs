//! # KLUE Review Crawler
//!
//! KLUE 강의평가 사이트에서 지정한 (학수번호, 교수명) 의 수강평을 모아 CSV 로
//! 내보내고, 그 CSV 를 SQLite 에 학수번호 기준으로 병합한다.
//!
//! ## 아키텍처
//!
//! ### ① 인프라 계층 (Infrastructure)
//! - `browser/` - 브라우저 실행, 로그인, 종료 (`BrowserSession`)
//! - `infrastructure/` - 유일한 Page 보유자 `JsExecutor`, 페이지 읽기 능력 `PageReader`
//!
//! ### ② 서비스 계층 (Services)
//! - `scroll` - 높이가 멈출 때까지 스크롤 / 고정 횟수 사전 스크롤
//! - `lecture_search` - 검색 결과에서 교수명이 맞는 강의 찾기
//! - `review_extractor` - 강의 페이지의 수강평 읽기
//! - `export` - BOM 포함 UTF-8 CSV 쓰기
//!
//! ### ③ 오케스트레이션 계층 (Orchestration)
//! - `orchestrator/crawl_app` - 세션 소유, 실행 전체, 내보내기
//! - `orchestrator/target_processor` - 대상 하나 처리, 실패 격리, 재시도
//!
//! ### ④ 저장소 계층 (Store)
//! - `store/` - CSV -> `courses` / `course_reviews` 병합 (학수번호 기준 upsert)

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;

pub use browser::BrowserSession;
pub use config::{Config, Credentials};
pub use error::{AppError, AppResult};
pub use infrastructure::{JsExecutor, PageReader};
pub use models::{CourseNames, LectureRef, ReviewRecord, Target};
pub use orchestrator::{App, CrawlReport, TargetProcessor};
pub use store::{MergeOptions, MergeReport, ReviewStore};
