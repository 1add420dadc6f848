use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// 크롤링 대상 (학수번호 + 교수명)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// 학수번호 (예: COSE341)
    pub course_code: String,
    /// 교수명 (예: 유혁)
    pub professor_name: String,
}

impl Target {
    pub fn new(course_code: impl Into<String>, professor_name: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            professor_name: professor_name.into(),
        }
    }

    /// 대상 파일이 없을 때 쓰는 기본 목록
    pub fn defaults() -> Vec<Target> {
        vec![
            Target::new("COSE111", "유용재"),
            Target::new("COSE341", "유혁"),
            Target::new("COSE389", "이문영"),
        ]
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.course_code, self.professor_name)
    }
}
