use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;

use crate::error::ConfigError;
use crate::models::{CourseNames, Target};

#[derive(Debug, Deserialize)]
struct TargetFile {
    #[serde(default)]
    targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct CourseNameFile {
    #[serde(default)]
    courses: HashMap<String, String>,
}

async fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// TOML 파일에서 크롤링 대상 목록을 읽는다
///
/// 파일이 없으면 기본 대상 목록을 돌려준다.
pub async fn load_targets(path: &Path) -> Result<Vec<Target>, ConfigError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        tracing::warn!(
            "대상 파일이 없어 기본 목록을 사용합니다: {}",
            path.display()
        );
        return Ok(Target::defaults());
    }

    let file: TargetFile = read_toml(path).await?;
    tracing::info!("대상 {} 개 로드: {}", file.targets.len(), path.display());
    Ok(file.targets)
}

/// TOML 파일에서 학수번호 -> 강의명 매핑을 읽는다
///
/// 파일이 없으면 내장 매핑을 돌려준다.
pub async fn load_course_names(path: &Path) -> Result<CourseNames, ConfigError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        tracing::debug!("강의명 매핑 파일 없음, 내장 매핑 사용: {}", path.display());
        return Ok(CourseNames::builtin());
    }

    let file: CourseNameFile = read_toml(path).await?;
    Ok(CourseNames::new(file.courses))
}
