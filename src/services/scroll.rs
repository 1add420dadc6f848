//! 스크롤 안정화 - 서비스 계층
//!
//! 무한 스크롤 페이지가 지연 로딩을 끝낼 때까지 아래로 내린다

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::PageReader;

/// 스크롤 안정화 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollSettings {
    /// 스크롤 후 대기 시간
    pub pause: Duration,
    /// 최대 반복 횟수
    pub max_rounds: u32,
    /// 높이가 연속으로 몇 번 같으면 멈출지
    pub stable_rounds: u32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            pause: Duration::from_secs(1),
            max_rounds: 50,
            stable_rounds: 3,
        }
    }
}

/// 안정화 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizeOutcome {
    /// 실제로 수행한 스크롤 횟수
    pub rounds: u32,
    /// 높이 변화가 멈췄는지 (false 면 max_rounds 에 걸림)
    pub settled: bool,
}

/// 페이지 높이가 더 이상 변하지 않을 때까지 스크롤한다
///
/// 매 회 맨 아래로 스크롤하고 `pause` 만큼 기다린 뒤 높이를 잰다. 직전 높이와
/// 같으면 연속 카운터를 올리고, 다르면 카운터를 0 으로 돌리고 새 높이를 기준으로
/// 삼는다. 카운터가 `stable_rounds` 에 닿거나 `max_rounds` 회를 채우면 끝난다.
pub async fn stabilize<R>(reader: &R, settings: ScrollSettings) -> AppResult<StabilizeOutcome>
where
    R: PageReader + ?Sized,
{
    let mut last_height = reader.scroll_height().await?;
    let mut stable = 0;
    let mut rounds = 0;

    while rounds < settings.max_rounds {
        reader.scroll_to_bottom().await?;
        sleep(settings.pause).await;
        rounds += 1;

        let new_height = reader.scroll_height().await?;
        debug!("스크롤 {}회, 높이: {}", rounds, new_height);

        if new_height == last_height {
            stable += 1;
        } else {
            stable = 0;
            last_height = new_height;
        }

        if stable >= settings.stable_rounds {
            return Ok(StabilizeOutcome {
                rounds,
                settled: true,
            });
        }
    }

    Ok(StabilizeOutcome {
        rounds,
        settled: false,
    })
}

/// 높이와 상관없이 정해진 횟수만큼 스크롤한다
///
/// 검색 결과 카드는 점진적으로 렌더링되므로 최선의 로딩이면 충분하다.
pub async fn prescroll<R>(reader: &R, rounds: u32, pause: Duration) -> AppResult<()>
where
    R: PageReader + ?Sized,
{
    for _ in 0..rounds {
        reader.scroll_to_bottom().await?;
        sleep(pause).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LectureCard;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 미리 정한 높이를 차례로 돌려주는 페이지
    struct HeightSequence {
        heights: Vec<u64>,
        reads: Mutex<usize>,
        scrolls: Mutex<u32>,
    }

    impl HeightSequence {
        fn new(heights: Vec<u64>) -> Self {
            Self {
                heights,
                reads: Mutex::new(0),
                scrolls: Mutex::new(0),
            }
        }

        fn scrolls(&self) -> u32 {
            *self.scrolls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageReader for HeightSequence {
        async fn navigate(&self, _url: &str) -> AppResult<()> {
            Ok(())
        }

        async fn scroll_to_bottom(&self) -> AppResult<()> {
            *self.scrolls.lock().unwrap() += 1;
            Ok(())
        }

        async fn scroll_height(&self) -> AppResult<u64> {
            let mut reads = self.reads.lock().unwrap();
            let height = self.heights[(*reads).min(self.heights.len() - 1)];
            *reads += 1;
            Ok(height)
        }

        async fn wait_for(&self, _selector: &str, _timeout: Duration) -> AppResult<bool> {
            Ok(true)
        }

        async fn lecture_cards(&self, _: &str, _: &str) -> AppResult<Vec<LectureCard>> {
            Ok(Vec::new())
        }

        async fn texts(&self, _selector: &str) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn settings(max_rounds: u32) -> ScrollSettings {
        ScrollSettings {
            pause: Duration::ZERO,
            max_rounds,
            stable_rounds: 3,
        }
    }

    #[tokio::test]
    async fn test_stops_three_rounds_after_growth_ends() {
        // 최초 100, 이후 200, 300 으로 자란 뒤 멈춤
        let page = HeightSequence::new(vec![100, 200, 300, 300, 300, 300, 300]);

        let outcome = stabilize(&page, settings(50)).await.unwrap();

        assert_eq!(
            outcome,
            StabilizeOutcome {
                rounds: 5,
                settled: true
            }
        );
        assert_eq!(page.scrolls(), 5);
    }

    #[tokio::test]
    async fn test_static_page_settles_in_stable_rounds() {
        let page = HeightSequence::new(vec![800]);

        let outcome = stabilize(&page, settings(50)).await.unwrap();

        assert_eq!(outcome.rounds, 3);
        assert!(outcome.settled);
    }

    #[tokio::test]
    async fn test_interrupted_stability_resets_counter() {
        let page = HeightSequence::new(vec![100, 100, 100, 150, 150, 150, 150]);

        let outcome = stabilize(&page, settings(50)).await.unwrap();

        // 100,100 (2회 안정) -> 150 (초기화) -> 150 x3
        assert_eq!(outcome.rounds, 6);
        assert!(outcome.settled);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_rounds() {
        let heights: Vec<u64> = (1..=200).map(|h| h * 10).collect();
        let page = HeightSequence::new(heights);

        let outcome = stabilize(&page, settings(7)).await.unwrap();

        assert_eq!(
            outcome,
            StabilizeOutcome {
                rounds: 7,
                settled: false
            }
        );
        assert_eq!(page.scrolls(), 7);
    }

    #[tokio::test]
    async fn test_prescroll_is_unconditional() {
        let page = HeightSequence::new(vec![500]);

        prescroll(&page, 5, Duration::ZERO).await.unwrap();

        assert_eq!(page.scrolls(), 5);
    }
}
