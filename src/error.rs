use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// 애플리케이션 최상위 오류
#[derive(Debug, Error)]
pub enum AppError {
    /// 브라우저 관련 오류
    #[error("브라우저 오류: {0}")]
    Browser(#[from] BrowserError),
    /// 로그인 오류
    #[error("로그인 오류: {0}")]
    Auth(#[from] AuthError),
    /// 페이지 구조 오류 (필수 요소 없음 등)
    #[error("크롤링 오류: {0}")]
    Crawl(#[from] CrawlError),
    /// CSV 내보내기 오류
    #[error("내보내기 오류: {0}")]
    Export(#[from] ExportError),
    /// DB 병합 오류
    #[error("병합 오류: {0}")]
    Merge(#[from] MergeError),
    /// 설정 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// 강의 페이지에 수강평 컨테이너가 끝내 나타나지 않은 경우
    pub fn is_missing_reviews(&self) -> bool {
        matches!(self, AppError::Crawl(CrawlError::NoReviewsFound { .. }))
    }

    /// 재시도해도 소용없는 오류 (로그인 실패, 설정 오류)
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Auth(_) | AppError::Config(_))
    }
}

/// 브라우저 관련 오류
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 브라우저 설정 실패
    #[error("브라우저 설정 실패: {0}")]
    Configuration(String),
    /// 브라우저 실행 실패
    #[error("브라우저 실행 실패: {source}")]
    LaunchFailed {
        #[source]
        source: CdpError,
    },
    /// 페이지 이동 실패
    #[error("{url} 로 이동 실패: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: CdpError,
    },
    /// 스크립트 실행 실패
    #[error("스크립트 실행 실패: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: CdpError,
    },
    /// 스크립트 결과 해석 실패
    #[error("스크립트 결과 해석 실패: {source}")]
    DecodeFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// 로그인 오류
#[derive(Debug, Error)]
pub enum AuthError {
    /// 로그인 링크/입력창/버튼을 찾지 못함
    #[error("로그인 화면 요소를 찾을 수 없습니다: {0}")]
    MissingControl(#[source] CrawlError),
    /// 제출 후에도 로그인 페이지에 머물러 있음
    #[error("로그인 후에도 로그인 페이지에 머물러 있습니다 (URL: {url})")]
    StillOnLoginPage { url: String },
    /// 입력/클릭 중 브라우저 오류
    #[error("로그인 입력 중 브라우저 오류: {0}")]
    Interaction(#[from] BrowserError),
}

/// 페이지 구조 오류
#[derive(Debug, Error)]
pub enum CrawlError {
    /// 필수 요소가 대기 시간 안에 나타나지 않음
    #[error("요소 `{selector}` 이(가) {timeout:?} 안에 나타나지 않았습니다")]
    ElementNotFound { selector: String, timeout: Duration },
    /// 검색 결과에 강의 카드가 없음
    #[error("{course_code} 검색 결과에 강의가 없습니다")]
    NoResultsFound { course_code: String },
    /// 강의 페이지에 수강평이 없음 (로딩 실패와 구분 불가)
    #[error("강의 {lecture_id} 에서 수강평을 찾을 수 없습니다")]
    NoReviewsFound { lecture_id: i64 },
    /// URL 조합 실패
    #[error("잘못된 URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// CSV 내보내기 오류
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("파일 쓰기 실패 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV 직렬화 실패: {0}")]
    Csv(#[from] csv::Error),
}

/// DB 병합 오류
#[derive(Debug, Error)]
pub enum MergeError {
    /// 입력 CSV 파일 없음
    #[error("파일을 찾을 수 없습니다: {}", path.display())]
    ArtifactMissing { path: PathBuf },
    /// 필수 컬럼 없음
    #[error("'{column}' 컬럼을 찾을 수 없습니다 (감지된 컬럼: {found:?})")]
    SchemaMismatch {
        column: &'static str,
        found: Vec<String>,
    },
    /// CSV 파일 읽기 실패
    #[error("CSV 파일 읽기 실패 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 데이터 행 파싱 실패
    #[error("{row}번째 행을 해석할 수 없습니다: {source}")]
    MalformedRecord {
        row: usize,
        #[source]
        source: csv::Error,
    },
    /// DB 파일 없음 (스키마는 별도 초기화 도구가 만든다)
    #[error("DB 파일이 존재하지 않습니다: {}", path.display())]
    DatabaseMissing { path: PathBuf },
    /// DB 연결 실패
    #[error("DB 연결 실패 ({}): {source}", path.display())]
    ConnectFailed {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
    /// 트랜잭션 시작/커밋 실패
    #[error("트랜잭션 실패: {0}")]
    Transaction(#[source] sqlx::Error),
    /// 특정 행 처리 중 DB 오류
    #[error("{row}번째 행 처리 중 DB 오류: {source}")]
    Store {
        row: usize,
        #[source]
        source: sqlx::Error,
    },
}

impl MergeError {
    /// 입력 CSV 자체의 문제 (파일 없음, 필수 컬럼 없음)
    ///
    /// 아무것도 쓰지 않은 상태이므로 보고만 하고 정상 종료한다.
    pub fn is_input_problem(&self) -> bool {
        matches!(
            self,
            MergeError::ArtifactMissing { .. } | MergeError::SchemaMismatch { .. }
        )
    }
}

/// 설정 오류
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("설정 파일 읽기 실패 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML 해석 실패 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{var_name} 값이 비어 있습니다")]
    EmptyCredential { var_name: &'static str },
    #[error("입력을 읽을 수 없습니다: {0}")]
    PromptFailed(#[source] std::io::Error),
}

// ========== 외부 오류 변환 ==========

impl From<CdpError> for AppError {
    fn from(err: CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed { source: err })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Browser(BrowserError::DecodeFailed { source: err })
    }
}

/// 애플리케이션 결과 타입
pub type AppResult<T> = Result<T, AppError>;
