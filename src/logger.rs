use tracing_subscriber::EnvFilter;

/// tracing 구독자 초기화
///
/// `RUST_LOG` 가 있으면 그대로 쓰고, 없으면 `verbose` 일 때 debug, 아니면 info.
/// 크롬 이벤트 처리기의 잡음은 warn 이상만 남긴다.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{level},chromiumoxide=warn,sqlx=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_switches_default_level() {
        assert_eq!(default_directives(false), "info,chromiumoxide=warn,sqlx=warn");
        assert_eq!(default_directives(true), "debug,chromiumoxide=warn,sqlx=warn");
    }
}
