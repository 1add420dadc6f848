//! 수강평 추출 서비스 - 서비스 계층

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::error::{AppResult, CrawlError};
use crate::infrastructure::PageReader;
use crate::services::scroll::{stabilize, ScrollSettings};

/// 수강평 본문 컨테이너
pub const REVIEW_SELECTOR: &str = "div.white-space_pre-wrap";

/// 수강평 추출 서비스
pub struct ReviewExtractor {
    base_url: Url,
    scroll: ScrollSettings,
    wait_timeout: Duration,
}

impl ReviewExtractor {
    pub fn new(base_url: Url, scroll: ScrollSettings, wait_timeout: Duration) -> Self {
        Self {
            base_url,
            scroll,
            wait_timeout,
        }
    }

    pub fn lecture_url(&self, lecture_id: i64) -> AppResult<Url> {
        let path = format!("/lectures/{}", lecture_id);
        self.base_url
            .join(&path)
            .map_err(|source| {
                CrawlError::InvalidUrl {
                    url: path.clone(),
                    source,
                }
                .into()
            })
    }

    /// 강의 페이지의 모든 수강평 (DOM 순서, 빈 문자열 제외)
    pub async fn extract<R>(&self, reader: &R, lecture_id: i64) -> AppResult<Vec<String>>
    where
        R: PageReader + ?Sized,
    {
        let url = self.lecture_url(lecture_id)?;
        reader.navigate(url.as_str()).await?;

        let outcome = stabilize(reader, self.scroll).await?;
        debug!(
            "강의 {} 스크롤 {}회 (안정화: {})",
            lecture_id, outcome.rounds, outcome.settled
        );

        if !reader.wait_for(REVIEW_SELECTOR, self.wait_timeout).await? {
            return Err(CrawlError::NoReviewsFound { lecture_id }.into());
        }

        let reviews = clean_reviews(reader.texts(REVIEW_SELECTOR).await?);
        info!("강의 {} 수강평 {} 개", lecture_id, reviews.len());
        Ok(reviews)
    }
}

/// 앞뒤 공백을 잘라내고 빈 항목을 버린다
pub fn clean_reviews(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_reviews_drops_blank_entries() {
        let raw = vec!["  ".to_string(), "좋은 강의".to_string(), String::new()];
        assert_eq!(clean_reviews(raw), vec!["좋은 강의".to_string()]);
    }

    #[test]
    fn test_clean_reviews_keeps_order_and_inner_newlines() {
        let raw = vec![
            "\n과제가 많아요\n시험은 무난\n".to_string(),
            "\t추천".to_string(),
        ];
        assert_eq!(
            clean_reviews(raw),
            vec!["과제가 많아요\n시험은 무난".to_string(), "추천".to_string()]
        );
    }

    #[test]
    fn test_lecture_url() {
        let extractor = ReviewExtractor::new(
            Url::parse("https://klue.kr").unwrap(),
            ScrollSettings::default(),
            Duration::ZERO,
        );
        assert_eq!(
            extractor.lecture_url(4821).unwrap().as_str(),
            "https://klue.kr/lectures/4821"
        );
    }
}
