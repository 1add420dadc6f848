//! 강의 검색 서비스 - 서비스 계층
//!
//! 학수번호로 검색하고, 교수명이 맞는 강의 카드만 골라 LectureRef 로 바꾼다

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};
use url::Url;

use crate::error::{AppResult, CrawlError};
use crate::infrastructure::PageReader;
use crate::models::{LectureCard, LectureRef};
use crate::services::scroll::prescroll;

/// 강의 상세 페이지로 가는 앵커
pub const LECTURE_LINK_SELECTOR: &str = r#"a[href^="/lectures/"]"#;
/// 교수명 문단 표기
pub const PROFESSOR_MARKER: &str = "교수님";

static YEAR_SEMESTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})년\s*([0-9])학기").expect("valid year/semester pattern"));

/// 강의 검색 서비스
///
/// 역할:
/// - 검색 페이지 이동, 사전 스크롤, 카드 읽기
/// - 교수명 부분 일치 필터, 연도/학기 해석, 강의 ID 중복 제거
pub struct LectureSearch {
    base_url: Url,
    prescroll_rounds: u32,
    prescroll_pause: Duration,
    wait_timeout: Duration,
}

impl LectureSearch {
    pub fn new(
        base_url: Url,
        prescroll_rounds: u32,
        prescroll_pause: Duration,
        wait_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            prescroll_rounds,
            prescroll_pause,
            wait_timeout,
        }
    }

    /// 학수번호 검색 URL (연도/학기 순 정렬)
    pub fn search_url(&self, course_code: &str) -> AppResult<Url> {
        let mut url = self
            .base_url
            .join("/search")
            .map_err(|source| CrawlError::InvalidUrl {
                url: self.base_url.to_string(),
                source,
            })?;
        url.query_pairs_mut()
            .append_pair("query", course_code)
            .append_pair("sort", "year_term");
        Ok(url)
    }

    /// 학수번호 + 교수명에 해당하는 강의 목록
    pub async fn resolve<R>(
        &self,
        reader: &R,
        course_code: &str,
        professor_name: &str,
    ) -> AppResult<Vec<LectureRef>>
    where
        R: PageReader + ?Sized,
    {
        let url = self.search_url(course_code)?;
        info!("🔍 강의 검색: {} / {}", course_code, professor_name);
        reader.navigate(url.as_str()).await?;

        prescroll(reader, self.prescroll_rounds, self.prescroll_pause).await?;

        if !reader
            .wait_for(LECTURE_LINK_SELECTOR, self.wait_timeout)
            .await?
        {
            return Err(CrawlError::NoResultsFound {
                course_code: course_code.to_string(),
            }
            .into());
        }

        let cards = reader
            .lecture_cards(LECTURE_LINK_SELECTOR, PROFESSOR_MARKER)
            .await?;
        debug!("강의 카드 {} 개 발견", cards.len());

        let lectures = select_lectures(&cards, professor_name, &self.base_url);
        info!("✓ {} 개 강의 찾음: {:?}", lectures.len(), lectures);
        Ok(lectures)
    }
}

/// 카드 목록에서 교수명이 맞는 강의를 페이지 순서대로 고른다
///
/// 같은 강의 ID 는 처음 나온 것만 남는다.
pub fn select_lectures(cards: &[LectureCard], professor_name: &str, base_url: &Url) -> Vec<LectureRef> {
    let mut seen = HashSet::new();
    let mut lectures = Vec::new();

    for card in cards {
        let Some(professor_text) = card.professor_text.as_deref() else {
            continue;
        };
        if !professor_text.contains(professor_name) {
            continue;
        }

        let (year, semester) = parse_year_semester(&card.header_text);

        let Some(lecture_id) = card
            .href
            .as_deref()
            .and_then(|href| lecture_id_from_href(href, base_url))
        else {
            continue;
        };

        if !seen.insert(lecture_id) {
            continue;
        }

        lectures.push(LectureRef {
            lecture_id,
            year,
            semester,
        });
    }

    lectures
}

/// "2025년 1학기 - COSE341(01)" 형태의 헤더에서 (연도, 학기) 를 꺼낸다
///
/// 형식이 맞지 않으면 (None, None).
pub fn parse_year_semester(header_text: &str) -> (Option<i32>, Option<u8>) {
    let Some(caps) = YEAR_SEMESTER.captures(header_text) else {
        return (None, None);
    };
    let year = caps[1].parse().ok();
    let semester = caps[2].parse().ok();
    match (year, semester) {
        (Some(y), Some(s)) => (Some(y), Some(s)),
        _ => (None, None),
    }
}

/// href 의 마지막 경로 조각을 강의 ID 로 해석한다
pub fn lecture_id_from_href(href: &str, base_url: &Url) -> Option<i64> {
    let url = base_url.join(href).ok()?;
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?
        .parse()
        .ok()
}
