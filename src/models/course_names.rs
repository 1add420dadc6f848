use std::collections::HashMap;

use phf::phf_map;

/// 매핑 파일이 없을 때 쓰는 학수번호 -> 강의명
static BUILTIN_COURSE_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "COSE111" => "전산수학I",
    "COSE341" => "운영체제",
    "COSE389" => "기업가정신과리더십",
};

/// 학수번호 -> 강의명 매핑
#[derive(Debug, Clone, Default)]
pub struct CourseNames {
    names: HashMap<String, String>,
}

impl CourseNames {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    pub fn builtin() -> Self {
        let names = BUILTIN_COURSE_NAMES
            .entries()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();
        Self { names }
    }

    /// 매핑이 없으면 학수번호를 그대로 돌려준다
    pub fn lookup<'a>(&'a self, course_code: &'a str) -> &'a str {
        self.names
            .get(course_code)
            .map(String::as_str)
            .unwrap_or(course_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_code() {
        let names = CourseNames::builtin();
        assert_eq!(names.lookup("COSE341"), "운영체제");
        assert_eq!(names.lookup("MATH101"), "MATH101");
    }
}
