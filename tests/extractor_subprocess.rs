#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use vc_portfolio_scraper::api::models::ScrapeRequest;
use vc_portfolio_scraper::error::{AppError, ExtractError};
use vc_portfolio_scraper::extractor::{CompanyRecord, Extractor, OutputMode, SubprocessExtractor};
use vc_portfolio_scraper::gate::ScrapeGate;

/// Runs `script` under `sh`; the page URL arrives as `$1`.
fn shell(script: &str, output: OutputMode) -> SubprocessExtractor {
    SubprocessExtractor::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "extractor".to_string()],
        output,
    )
}

fn file_mode() -> OutputMode {
    OutputMode::File("portfolio_companies.csv".to_string())
}

#[tokio::test]
async fn test_reads_records_from_stdout() {
    let extractor = shell(
        r#"printf '%s\n' 'Company,URL' "Acme Inc,$1/acme" '"Beta, LLC",https://beta.com'"#,
        OutputMode::Stdout,
    );

    let records = extractor.extract("https://vc.example").await.unwrap();

    assert_eq!(
        records,
        vec![
            CompanyRecord::new("Acme Inc", "https://vc.example/acme"),
            CompanyRecord::new("Beta, LLC", "https://beta.com"),
        ]
    );
}

#[tokio::test]
async fn test_reads_records_from_output_file() {
    let extractor = shell(
        r#"printf '%s\n' 'Company,URL' 'Acme Inc,https://acme.io' > portfolio_companies.csv"#,
        file_mode(),
    );

    let records = extractor.extract("https://vc.example").await.unwrap();

    assert_eq!(records, vec![CompanyRecord::new("Acme Inc", "https://acme.io")]);
}

#[tokio::test]
async fn test_output_path_is_passed_explicitly() {
    let extractor = shell(
        r#"cd / && printf '%s\n' 'Company,URL' 'Acme Inc,https://acme.io' > "$SCRAPER_OUTPUT_PATH""#,
        file_mode(),
    );

    let records = extractor.extract("https://vc.example").await.unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_non_zero_exit_carries_stderr() {
    let extractor = shell(r#"echo "cannot load $1" >&2; exit 3"#, OutputMode::Stdout);

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    match err {
        ExtractError::ProcessFailed { status, stderr } => {
            assert_eq!(status.code(), Some(3));
            assert_eq!(stderr.trim(), "cannot load https://vc.example");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_clean_exit_without_file_is_output_missing() {
    let extractor = shell("exit 0", file_mode());

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    match err {
        ExtractError::OutputMissing { path } => {
            assert!(path.ends_with("portfolio_companies.csv"));
            // the scratch directory that was checked is gone
            assert!(!path.parent().unwrap().exists());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_scratch_directory_removed_after_failure() {
    let extractor = shell("pwd >&2; exit 1", OutputMode::Stdout);

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    let ExtractError::ProcessFailed { stderr, .. } = err else {
        panic!("expected process failure");
    };
    let scratch = Path::new(stderr.trim());
    assert!(scratch.is_absolute());
    assert!(!scratch.exists());
}

#[tokio::test]
async fn test_concurrent_invocations_are_isolated() {
    let extractor = shell(
        r#"echo 'Company,URL' > portfolio_companies.csv
           echo "Only,$1" >> portfolio_companies.csv
           sleep 0.2
           cat portfolio_companies.csv"#,
        OutputMode::Stdout,
    );

    let (first, second) = tokio::join!(
        extractor.extract("https://one.example"),
        extractor.extract("https://two.example"),
    );

    assert_eq!(first.unwrap(), vec![CompanyRecord::new("Only", "https://one.example")]);
    assert_eq!(second.unwrap(), vec![CompanyRecord::new("Only", "https://two.example")]);
}

#[tokio::test]
async fn test_malformed_output_is_rejected() {
    let extractor = shell(r#"printf '%s\n' 'Company,URL' 'a,b,c'"#, OutputMode::Stdout);

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    assert!(matches!(err, ExtractError::MalformedOutput(_)));
}

#[tokio::test]
async fn test_output_without_header_is_rejected() {
    let extractor = shell(
        r#"printf '%s\n' 'Acme Inc,https://acme.io' 'Beta,https://beta.com'"#,
        OutputMode::Stdout,
    );

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    assert!(matches!(err, ExtractError::MalformedOutput(_)));
}

#[tokio::test]
async fn test_field_whitespace_is_preserved() {
    let extractor = shell(
        r#"printf '%s\n' 'Company,URL' ' Acme Inc ,https://acme.io'"#,
        OutputMode::Stdout,
    );

    let records = extractor.extract("https://vc.example").await.unwrap();

    assert_eq!(records, vec![CompanyRecord::new(" Acme Inc ", "https://acme.io")]);
}

#[tokio::test]
async fn test_missing_program_fails_to_spawn() {
    let extractor = SubprocessExtractor::new("/nonexistent/extractor", vec![], OutputMode::Stdout);

    let err = extractor.extract("https://vc.example").await.unwrap_err();

    assert!(matches!(err, ExtractError::Spawn(_)));
}

#[tokio::test]
async fn test_gate_times_out_stuck_process() {
    let extractor = Arc::new(shell("sleep 30", OutputMode::Stdout));
    let gate = ScrapeGate::new(extractor, Duration::from_secs(1));

    let start = Instant::now();
    let err = gate
        .scrape(ScrapeRequest {
            url: Some("https://vc.example".to_string()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_gate_reports_header_only_output_as_no_data() {
    let extractor = Arc::new(shell("echo 'Company,URL'", OutputMode::Stdout));
    let gate = ScrapeGate::new(extractor, Duration::from_secs(10));

    let err = gate
        .scrape(ScrapeRequest {
            url: Some("https://vc.example".to_string()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoData));
}
