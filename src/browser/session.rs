use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{Config, Credentials};
use crate::error::{AppResult, AuthError, BrowserError};
use crate::infrastructure::JsExecutor;

const LOGIN_LINK: &str = r#"a[href="/login"]"#;
const USERNAME_INPUT: &str = r#"input[placeholder="아이디"]"#;
const PASSWORD_INPUT: &str = r#"input[placeholder="비밀번호"]"#;
const LOGIN_BUTTON: &str = r#"//button[contains(text(), "로그인")]"#;

/// 인증된 브라우저 세션 하나
///
/// 실행 한 번 동안 오케스트레이터가 독점적으로 소유한다. `close` 는 self 를
/// 소비하므로 한 번만 호출할 수 있다.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    executor: JsExecutor,
    explicit_wait: Duration,
}

impl BrowserSession {
    /// 브라우저를 띄우고 빈 페이지 하나를 연다
    pub async fn open(config: &Config) -> AppResult<Self> {
        info!("🚀 브라우저 실행 중...");

        let mut builder = BrowserConfig::builder()
            .viewport(None)
            .arg("--start-maximized");
        builder = if config.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        let browser_config = builder.build().map_err(|e| {
            error!("브라우저 설정 실패: {}", e);
            BrowserError::Configuration(e)
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("브라우저 실행 실패: {}", e);
            BrowserError::LaunchFailed { source: e }
        })?;
        debug!("브라우저 실행 성공");

        // 브라우저 이벤트는 백그라운드에서 처리
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        sleep(Duration::from_millis(300)).await;

        let page = browser.new_page("about:blank").await.map_err(|e| {
            error!("페이지 생성 실패: {}", e);
            BrowserError::LaunchFailed { source: e }
        })?;

        Ok(Self {
            browser,
            handler,
            executor: JsExecutor::new(page, config.implicit_wait()),
            explicit_wait: config.explicit_wait(),
        })
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 로그인 화면에서 아이디/비밀번호를 입력하고 제출한다
    pub async fn authenticate(
        &self,
        base_url: &str,
        credentials: &Credentials,
        settle: Duration,
    ) -> AppResult<()> {
        info!("🔐 로그인 시도: {}", credentials.username);
        let executor = &self.executor;
        executor.goto(base_url).await?;

        executor
            .wait_for_selector(LOGIN_LINK, self.explicit_wait)
            .await
            .map_err(AuthError::MissingControl)?;
        executor.eval(click_selector_js(LOGIN_LINK)?).await?;

        executor
            .wait_for_selector(USERNAME_INPUT, self.explicit_wait)
            .await
            .map_err(AuthError::MissingControl)?;
        executor
            .find(PASSWORD_INPUT)
            .await
            .map_err(AuthError::MissingControl)?;
        executor
            .eval(fill_login_form_js(&credentials.username, &credentials.password)?)
            .await?;

        executor
            .find_xpath(LOGIN_BUTTON)
            .await
            .map_err(AuthError::MissingControl)?;
        executor.eval(click_xpath_js(LOGIN_BUTTON)?).await?;

        sleep(settle).await;

        let url = executor.current_url().await?.unwrap_or_default();
        info!("로그인 후 URL: {}", url);
        if is_login_page(&url) {
            return Err(AuthError::StillOnLoginPage { url }.into());
        }

        info!("✓ 로그인 완료");
        Ok(())
    }

    /// 브라우저 프로세스를 종료한다
    pub async fn close(mut self) {
        info!("🧹 브라우저 종료 중...");
        if let Err(e) = self.browser.close().await {
            warn!("브라우저 종료 명령 실패: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("브라우저 프로세스 대기 실패: {}", e);
        }
        self.handler.abort();
        debug!("브라우저 종료 완료");
    }
}

fn click_selector_js(selector: &str) -> serde_json::Result<String> {
    Ok(format!(
        "(() => {{ const el = document.querySelector({}); if (el) el.click(); return !!el; }})()",
        serde_json::to_string(selector)?
    ))
}

fn click_xpath_js(xpath: &str) -> serde_json::Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const el = document.evaluate({}, document, null,
                XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
            if (el) el.click();
            return !!el;
        }})()
        "#,
        serde_json::to_string(xpath)?
    ))
}

/// 아이디/비밀번호 입력창을 비우고 값을 넣는다
///
/// React 입력창은 value 를 직접 바꾸면 상태에 반영되지 않으므로 네이티브
/// setter 로 넣고 input 이벤트를 보낸다.
fn fill_login_form_js(username: &str, password: &str) -> serde_json::Result<String> {
    Ok(format!(
        r#"
        (() => {{
            const setter = Object.getOwnPropertyDescriptor(
                window.HTMLInputElement.prototype, 'value').set;
            const fill = (selector, value) => {{
                const input = document.querySelector(selector);
                if (!input) return false;
                input.focus();
                setter.call(input, '');
                setter.call(input, value);
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                input.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }};
            return fill({}, {}) && fill({}, {});
        }})()
        "#,
        serde_json::to_string(USERNAME_INPUT)?,
        serde_json::to_string(username)?,
        serde_json::to_string(PASSWORD_INPUT)?,
        serde_json::to_string(password)?,
    ))
}

/// 현재 URL 이 로그인 화면인지
fn is_login_page(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.path().trim_end_matches('/').ends_with("/login"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_login_page() {
        assert!(is_login_page("https://klue.kr/login"));
        assert!(is_login_page("https://klue.kr/login/"));
        assert!(!is_login_page("https://klue.kr/"));
        assert!(!is_login_page("https://klue.kr/lectures/12"));
        assert!(!is_login_page(""));
    }

    #[test]
    fn test_login_form_script_escapes_values() {
        let js = fill_login_form_js("student", r#"pa"ss'\word"#).unwrap();
        assert!(js.contains(r#""pa\"ss'\\word""#));
        assert!(js.contains(r#""input[placeholder=\"아이디\"]""#));
    }

    #[tokio::test]
    #[ignore] // 크롬과 실제 계정 필요: cargo test -- --ignored
    async fn test_open_and_authenticate() {
        let _ = tracing_subscriber::fmt::try_init();
        let _ = dotenvy::dotenv();

        let config = Config::from_env();
        let credentials = Credentials::from_env_or_prompt().expect("로그인 정보 필요");

        let session = BrowserSession::open(&config).await.expect("브라우저 실행 실패");
        let result = session
            .authenticate(&config.base_url, &credentials, config.login_settle())
            .await;
        session.close().await;

        assert!(result.is_ok(), "로그인에 성공해야 합니다: {:?}", result.err());
    }
}
