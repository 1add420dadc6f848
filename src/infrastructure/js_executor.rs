//! JS 실행기 - 인프라 계층
//!
//! 유일한 Page 자원을 보유하고, 이동/대기/JS 실행 능력만 노출한다

use std::time::Duration;

use chromiumoxide::{Element, Page};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppResult, BrowserError, CrawlError};

/// 요소 대기 중 재조회 간격
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// JS 실행기
///
/// 역할:
/// - 유일한 Page 자원 보유
/// - eval() / 이동 / 요소 대기 능력 제공
/// - 강의나 수강평 같은 도메인 개념은 모른다
pub struct JsExecutor {
    page: Page,
    implicit_wait: Duration,
}

impl JsExecutor {
    /// `implicit_wait` 은 `find` 계열 조회에 적용되는 기본 대기 시간이다
    pub fn new(page: Page, implicit_wait: Duration) -> Self {
        Self {
            page,
            implicit_wait,
        }
    }

    /// JS 코드를 실행하고 JSON 결과를 돌려준다
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// JS 코드를 실행하고 지정한 타입으로 역직렬화한다
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    pub async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("이동: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|source| BrowserError::NavigationFailed {
                url: url.to_string(),
                source,
            })?;
        Ok(())
    }

    pub async fn current_url(&self) -> AppResult<Option<String>> {
        Ok(self.page.url().await?)
    }

    /// CSS 선택자에 맞는 요소가 나타날 때까지 기다린다
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, CrawlError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(CrawlError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// XPath 에 맞는 요소가 나타날 때까지 기다린다
    pub async fn wait_for_xpath(&self, xpath: &str, timeout: Duration) -> Result<Element, CrawlError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_xpath(xpath).await {
                return Ok(element);
            }
            if Instant::now() >= deadline {
                return Err(CrawlError::ElementNotFound {
                    selector: xpath.to_string(),
                    timeout,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 기본 대기 시간을 적용한 요소 조회
    pub async fn find(&self, selector: &str) -> Result<Element, CrawlError> {
        self.wait_for_selector(selector, self.implicit_wait).await
    }

    /// 기본 대기 시간을 적용한 XPath 조회
    pub async fn find_xpath(&self, xpath: &str) -> Result<Element, CrawlError> {
        self.wait_for_xpath(xpath, self.implicit_wait).await
    }
}
