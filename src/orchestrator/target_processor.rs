//! 대상 처리기 - 오케스트레이션 계층
//!
//! ## 역할
//!
//! 1. **강의 검색**: 학수번호 + 교수명 -> `Vec<LectureRef>`
//! 2. **수강평 추출**: 강의마다 수강평을 읽어 `ReviewRecord` 로 만든다
//! 3. **실패 격리**: 대상 하나가 실패해도 다음 대상으로 넘어간다
//! 4. **재시도**: 실패한 대상은 지수 백오프로 다시 시도한다
//!
//! 대상의 행은 그 대상이 끝까지 성공했을 때만 누적된다.

use std::fmt;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{AppResult, CrawlError};
use crate::infrastructure::PageReader;
use crate::models::{ReviewRecord, Target};
use crate::services::{LectureSearch, ReviewExtractor};
use crate::utils::logging::truncate_text;

/// 대상 단위 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (1 이면 재시도 없음)
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간, 이후 두 배씩
    pub backoff: Duration,
}

impl RetryPolicy {
    /// `attempt` 번째 시도가 실패한 뒤 기다릴 시간
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// 대상 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Succeeded { lectures: usize, reviews: usize },
    Failed { cause: String, attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: Target,
    pub status: TargetStatus,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TargetStatus::Succeeded { .. })
    }
}

impl fmt::Display for TargetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            TargetStatus::Succeeded { lectures, reviews } => {
                write!(f, "✅ {} - 강의 {}개, 후기 {}개", self.target, lectures, reviews)
            }
            TargetStatus::Failed { cause, attempts } => {
                write!(f, "❌ {} - {}회 시도 후 실패: {}", self.target, attempts, cause)
            }
        }
    }
}

/// 실행 한 번의 결과
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub rows: Vec<ReviewRecord>,
    pub outcomes: Vec<TargetOutcome>,
}

impl CrawlReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// 대상 처리기
pub struct TargetProcessor {
    search: LectureSearch,
    extractor: ReviewExtractor,
    retry: RetryPolicy,
}

impl TargetProcessor {
    pub fn new(search: LectureSearch, extractor: ReviewExtractor, retry: RetryPolicy) -> Self {
        Self {
            search,
            extractor,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|source| CrawlError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let search = LectureSearch::new(
            base_url.clone(),
            config.search_prescroll_rounds,
            config.search_prescroll_pause(),
            config.explicit_wait(),
        );
        let extractor =
            ReviewExtractor::new(base_url, config.review_scroll(), config.explicit_wait());
        let retry = RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            backoff: config.retry_backoff(),
        };

        Ok(Self::new(search, extractor, retry))
    }

    /// 모든 대상을 순서대로 처리한다
    pub async fn run<R>(&self, reader: &R, targets: &[Target]) -> CrawlReport
    where
        R: PageReader + ?Sized,
    {
        let mut report = CrawlReport::default();

        for (index, target) in targets.iter().enumerate() {
            info!("\n=== [{}/{}] {} 크롤링 시작 ===", index + 1, targets.len(), target);

            let mut attempt = 1;
            let status = loop {
                match self.process_target(reader, target).await {
                    Ok((lectures, rows)) => {
                        let status = TargetStatus::Succeeded {
                            lectures,
                            reviews: rows.len(),
                        };
                        report.rows.extend(rows);
                        break status;
                    }
                    Err(e) if e.is_fatal() || attempt >= self.retry.max_attempts => {
                        error!("[{}] ❌ 처리 실패 ({}회 시도): {}", target, attempt, e);
                        break TargetStatus::Failed {
                            cause: e.to_string(),
                            attempts: attempt,
                        };
                    }
                    Err(e) => {
                        let delay = self.retry.delay(attempt);
                        warn!(
                            "[{}] ⚠️ 실패 (시도 {}/{}), {:?} 후 재시도: {}",
                            target, attempt, self.retry.max_attempts, delay, e
                        );
                        sleep(delay).await;
                        attempt += 1;
                    }
                }
            };

            report.outcomes.push(TargetOutcome {
                target: target.clone(),
                status,
            });
        }

        report
    }

    /// 대상 하나: 강의 검색 후 강의마다 수강평 추출
    ///
    /// # 반환
    /// (찾은 강의 수, 수강평 행)
    pub async fn process_target<R>(
        &self,
        reader: &R,
        target: &Target,
    ) -> AppResult<(usize, Vec<ReviewRecord>)>
    where
        R: PageReader + ?Sized,
    {
        let lectures = self
            .search
            .resolve(reader, &target.course_code, &target.professor_name)
            .await?;

        let mut rows = Vec::new();
        for lecture in &lectures {
            let reviews = match self.extractor.extract(reader, lecture.lecture_id).await {
                Ok(reviews) => reviews,
                Err(e) if e.is_missing_reviews() => {
                    warn!("강의 {} 에 수강평이 없어 건너뜁니다", lecture.lecture_id);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            info!(
                "강의 {} ({:?}년 {:?}학기, {}) 후기 {}개",
                lecture.lecture_id,
                lecture.year,
                lecture.semester,
                target,
                reviews.len()
            );

            for review in reviews {
                debug!("  - {}", truncate_text(&review, 40));
                rows.push(ReviewRecord::new(target, lecture, review));
            }
        }

        Ok((lectures.len(), rows))
    }
}
