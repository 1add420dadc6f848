use klue_review_crawler::config::{Config, Credentials};
use klue_review_crawler::logger;
use klue_review_crawler::models::Target;
use klue_review_crawler::App;

#[tokio::test]
#[ignore] // 실제 계정과 브라우저 필요: KLUE_ID, KLUE_PW 설정 후 cargo test -- --ignored
async fn test_crawl_single_target() {
    let _ = dotenvy::dotenv();

    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    logger::init(config.verbose_logging);
    config.output_csv = dir.path().join("klue_reviews_multi.csv");
    config.run_log_file = dir.path().join("crawl_log.txt");

    let credentials = Credentials::from_env_or_prompt().expect("로그인 정보 필요");
    let targets = vec![Target::new("COSE341", "유혁")];

    let report = App::initialize(config.clone(), credentials, targets)
        .expect("초기화 실패")
        .run()
        .await
        .expect("크롤링 실패");

    assert_eq!(report.outcomes.len(), 1);
    assert!(config.output_csv.exists());
}
