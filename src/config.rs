use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::services::scroll::ScrollSettings;

/// 프로그램 설정
#[derive(Clone, Debug)]
pub struct Config {
    /// 사이트 주소
    pub base_url: String,
    /// 헤드리스 모드로 브라우저 실행
    pub headless: bool,
    /// 요소 조회 기본 대기 시간 (초)
    pub implicit_wait_secs: u64,
    /// 명시적 대기 시간 (초)
    pub explicit_wait_secs: u64,
    /// 로그인 제출 후 대기 시간 (초)
    pub login_settle_secs: u64,
    // --- 스크롤 ---
    pub review_scroll_pause_ms: u64,
    pub review_scroll_max_rounds: u32,
    pub stable_rounds: u32,
    pub search_prescroll_rounds: u32,
    pub search_prescroll_pause_ms: u64,
    // --- 재시도 ---
    /// 대상별 최대 시도 횟수
    pub max_attempts: u32,
    /// 첫 재시도 대기 시간 (초), 이후 두 배씩 증가
    pub retry_backoff_secs: u64,
    // --- 파일 ---
    pub targets_file: PathBuf,
    pub output_csv: PathBuf,
    pub database_path: PathBuf,
    pub course_names_file: PathBuf,
    pub run_log_file: PathBuf,
    /// 상세 로그 출력
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://klue.kr".to_string(),
            headless: false,
            implicit_wait_secs: 5,
            explicit_wait_secs: 10,
            login_settle_secs: 5,
            review_scroll_pause_ms: 1000,
            review_scroll_max_rounds: 50,
            stable_rounds: 3,
            search_prescroll_rounds: 5,
            search_prescroll_pause_ms: 1500,
            max_attempts: 3,
            retry_backoff_secs: 2,
            targets_file: PathBuf::from("targets.toml"),
            output_csv: PathBuf::from("klue_reviews_multi.csv"),
            database_path: PathBuf::from("hackathon.db"),
            course_names_file: PathBuf::from("course_names.toml"),
            run_log_file: PathBuf::from("crawl_log.txt"),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: env_or("KLUE_BASE_URL", default.base_url),
            headless: env_parse("KLUE_HEADLESS", default.headless),
            implicit_wait_secs: env_parse("IMPLICIT_WAIT_SECS", default.implicit_wait_secs),
            explicit_wait_secs: env_parse("EXPLICIT_WAIT_SECS", default.explicit_wait_secs),
            login_settle_secs: env_parse("LOGIN_SETTLE_SECS", default.login_settle_secs),
            review_scroll_pause_ms: env_parse("REVIEW_SCROLL_PAUSE_MS", default.review_scroll_pause_ms),
            review_scroll_max_rounds: env_parse("REVIEW_SCROLL_MAX_ROUNDS", default.review_scroll_max_rounds),
            stable_rounds: env_parse("SCROLL_STABLE_ROUNDS", default.stable_rounds),
            search_prescroll_rounds: env_parse("SEARCH_PRESCROLL_ROUNDS", default.search_prescroll_rounds),
            search_prescroll_pause_ms: env_parse("SEARCH_PRESCROLL_PAUSE_MS", default.search_prescroll_pause_ms),
            max_attempts: env_parse("MAX_ATTEMPTS", default.max_attempts).max(1),
            retry_backoff_secs: env_parse("RETRY_BACKOFF_SECS", default.retry_backoff_secs),
            targets_file: env_or("TARGETS_FILE", default.targets_file),
            output_csv: env_or("OUTPUT_CSV", default.output_csv),
            database_path: env_or("DATABASE_PATH", default.database_path),
            course_names_file: env_or("COURSE_NAMES_FILE", default.course_names_file),
            run_log_file: env_or("RUN_LOG_FILE", default.run_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
        }
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    pub fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }

    pub fn login_settle(&self) -> Duration {
        Duration::from_secs(self.login_settle_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    /// 강의 페이지 스크롤 안정화 설정
    pub fn review_scroll(&self) -> ScrollSettings {
        ScrollSettings {
            pause: Duration::from_millis(self.review_scroll_pause_ms),
            max_rounds: self.review_scroll_max_rounds,
            stable_rounds: self.stable_rounds,
        }
    }

    pub fn search_prescroll_pause(&self) -> Duration {
        Duration::from_millis(self.search_prescroll_pause_ms)
    }
}

fn env_or<T: From<String>>(name: &str, default: T) -> T {
    std::env::var(name).map(T::from).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 로그인 정보
///
/// 비밀번호는 `Debug` 출력에서 가려진다.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub const USERNAME_VAR: &'static str = "KLUE_ID";
    pub const PASSWORD_VAR: &'static str = "KLUE_PW";

    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into().trim().to_string();
        let password = password.into();
        if username.is_empty() {
            return Err(ConfigError::EmptyCredential {
                var_name: Self::USERNAME_VAR,
            });
        }
        if password.is_empty() {
            return Err(ConfigError::EmptyCredential {
                var_name: Self::PASSWORD_VAR,
            });
        }
        Ok(Self { username, password })
    }

    /// 환경 변수에서 읽고, 없으면 터미널에서 입력받는다
    ///
    /// 비밀번호는 화면에 보이지 않게 입력받는다.
    pub fn from_env_or_prompt() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok(), prompt, prompt_hidden)
    }

    fn resolve<E, V, H>(env: E, visible: V, hidden: H) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
        V: FnOnce(&str) -> Result<String, ConfigError>,
        H: FnOnce(&str) -> Result<String, ConfigError>,
    {
        let username = match env(Self::USERNAME_VAR) {
            Some(v) if !v.is_empty() => v,
            _ => visible("KLUE 아이디: ")?,
        };
        let password = match env(Self::PASSWORD_VAR) {
            Some(v) if !v.is_empty() => v,
            _ => hidden("KLUE 비밀번호: ")?,
        };
        Self::new(username, password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn prompt(label: &str) -> Result<String, ConfigError> {
    let mut stdout = io::stdout();
    stdout
        .write_all(label.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(ConfigError::PromptFailed)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(ConfigError::PromptFailed)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_hidden(label: &str) -> Result<String, ConfigError> {
    rpassword::prompt_password(label).map_err(ConfigError::PromptFailed)
}
