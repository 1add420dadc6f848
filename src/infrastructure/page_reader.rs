//! 페이지 읽기 능력
//!
//! 탐색/스크롤/대기/추출을 이름 있는 메서드로 분리해 두어, DOM 구조에 대한
//! 가정이 서비스 로직과 섞이지 않고 가짜 페이지로 대체할 수 있게 한다.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::AppResult;
use crate::infrastructure::JsExecutor;
use crate::models::LectureCard;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait PageReader: Send + Sync {
    /// URL 로 이동
    async fn navigate(&self, url: &str) -> AppResult<()>;

    /// 현재 문서의 맨 아래로 스크롤
    async fn scroll_to_bottom(&self) -> AppResult<()>;

    /// 문서의 스크롤 가능한 높이
    async fn scroll_height(&self) -> AppResult<u64>;

    /// 선택자에 맞는 요소가 하나 이상 나타나면 true, 시간 초과면 false
    async fn wait_for(&self, selector: &str, timeout: Duration) -> AppResult<bool>;

    /// 선택자에 맞는 모든 앵커를 강의 카드로 읽는다
    ///
    /// `marker` 가 들어 있는 문단을 교수명 블록으로 본다.
    async fn lecture_cards(&self, selector: &str, marker: &str) -> AppResult<Vec<LectureCard>>;

    /// 선택자에 맞는 모든 요소의 보이는 텍스트 (DOM 순서)
    async fn texts(&self, selector: &str) -> AppResult<Vec<String>>;
}

#[async_trait]
impl PageReader for JsExecutor {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        self.goto(url).await
    }

    async fn scroll_to_bottom(&self) -> AppResult<()> {
        self.eval("window.scrollTo(0, document.body.scrollHeight); true")
            .await?;
        Ok(())
    }

    async fn scroll_height(&self) -> AppResult<u64> {
        self.eval_as("document.body.scrollHeight").await
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> AppResult<bool> {
        let js_code = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(selector)?
        );
        let deadline = Instant::now() + timeout;
        loop {
            let count: u64 = self.eval_as(js_code.as_str()).await?;
            if count > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn lecture_cards(&self, selector: &str, marker: &str) -> AppResult<Vec<LectureCard>> {
        let js_code = format!(
            r#"
            (() => {{
                const marker = {marker};
                return Array.from(document.querySelectorAll({selector})).map(a => {{
                    const paragraphs = Array.from(a.querySelectorAll('p'));
                    const prof = paragraphs.find(p => (p.innerText || '').includes(marker));
                    return {{
                        href: a.href || a.getAttribute('href'),
                        professor_text: prof ? prof.innerText.trim() : null,
                        header_text: paragraphs.length ? (paragraphs[0].innerText || '').trim() : ''
                    }};
                }});
            }})()
            "#,
            marker = serde_json::to_string(marker)?,
            selector = serde_json::to_string(selector)?,
        );
        self.eval_as(js_code).await
    }

    async fn texts(&self, selector: &str) -> AppResult<Vec<String>> {
        let js_code = format!(
            "Array.from(document.querySelectorAll({})).map(e => e.innerText || '')",
            serde_json::to_string(selector)?
        );
        self.eval_as(js_code).await
    }
}
