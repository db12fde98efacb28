//! Integration tests for the crawler
//!
//! Most tests drive the real extractor and checkpoint log with a scripted
//! page loader. The last test runs a full session against a wiremock server.

use async_trait::async_trait;
use serial_scribe::checkpoint::{
    CheckpointError, CheckpointLog, CheckpointRecord, CheckpointResult, CheckpointStore,
    ContentUnit,
};
use serial_scribe::config::{
    BookFormat, Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use serial_scribe::crawler::{
    run_session, CrawlOutcome, Driver, FetchError, HtmlExtractor, PageLoader, RateLimiter,
    RetryController,
};
use serial_scribe::output::assemble_book;
use serial_scribe::session::{CrawlSession, Operator};
use serial_scribe::{CrawlState, ScribeError};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone)]
enum Response {
    Page(String),
    Missing,
    Fail,
}

/// Page loader that plays back a script per URL
///
/// Each URL's responses are consumed in order; the last one repeats.
#[derive(Default)]
struct ScriptedLoader {
    script: Mutex<HashMap<String, VecDeque<Response>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    fn with(self, url: &str, responses: Vec<Response>) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
        self
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageLoader for ScriptedLoader {
    async fn load_page(&self, url: &str) -> Result<Option<String>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let mut script = self.script.lock().unwrap();
        let response = match script.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match response {
            Some(Response::Page(content)) => Ok(Some(content)),
            Some(Response::Missing) | None => Ok(None),
            Some(Response::Fail) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Operator answering retry prompts from a queue
#[derive(Default)]
struct ScriptedOperator {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<(String, u32)>>,
    prompt_fails: bool,
}

impl ScriptedOperator {
    fn answering(answers: Vec<bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
            prompt_fails: false,
        }
    }

    /// An operator whose prompt cannot be shown, e.g. without a terminal
    fn without_terminal() -> Self {
        Self {
            prompt_fails: true,
            ..Self::default()
        }
    }

    fn asked(&self) -> Vec<(String, u32)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn session_params(&self) -> serial_scribe::Result<CrawlSession> {
        Err(ScribeError::Session("not interactive".to_string()))
    }

    async fn confirm_retry(&self, url: &str, attempts: u32) -> serial_scribe::Result<bool> {
        self.asked.lock().unwrap().push((url.to_string(), attempts));
        if self.prompt_fails {
            return Err(ScribeError::Prompt("not a terminal".to_string()));
        }
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

#[async_trait]
impl<'a> Operator for &'a ScriptedOperator {
    async fn session_params(&self) -> serial_scribe::Result<CrawlSession> {
        (**self).session_params().await
    }

    async fn confirm_retry(&self, url: &str, attempts: u32) -> serial_scribe::Result<bool> {
        (**self).confirm_retry(url, attempts).await
    }
}

/// Store whose writes always fail
struct FullDisk;

impl CheckpointStore for FullDisk {
    fn append(&mut self, _record: &CheckpointRecord) -> CheckpointResult<()> {
        Err(CheckpointError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }

    fn rebuild(&self) -> CheckpointResult<Vec<CheckpointRecord>> {
        Ok(Vec::new())
    }
}

fn site(base_url: &str) -> SiteConfig {
    SiteConfig {
        base_url: base_url.to_string(),
        title_selector: "h1".to_string(),
        content_selector: "#content".to_string(),
        next_selector: "a.next".to_string(),
        next_attribute: "href".to_string(),
    }
}

fn chapter(title: &str, text: &str, next: Option<&str>) -> String {
    let next = next
        .map(|n| format!(r#"<a class="next" href="{}">Next</a>"#, n))
        .unwrap_or_default();
    format!(
        concat!(
            r#"<html><body><h1>{}</h1>"#,
            r#"<div id="content"><p>{}</p><div class="ad">Buy now</div></div>"#,
            r#"{}</body></html>"#
        ),
        title, text, next
    )
}

fn page(title: &str, next: Option<&str>) -> Response {
    Response::Page(chapter(title, &format!("Text of {}.", title), next))
}

/// Three chapters chained /c1 -> /c2 -> /c3
fn three_chapters() -> ScriptedLoader {
    ScriptedLoader::default()
        .with("/c1", vec![page("One", Some("/c2"))])
        .with("/c2", vec![page("Two", Some("/c3"))])
        .with("/c3", vec![page("Three", None)])
}

fn driver<'a, C: CheckpointStore>(
    loader: &'a ScriptedLoader,
    store: C,
    operator: &'a ScriptedOperator,
) -> Driver<&'a ScriptedLoader, HtmlExtractor, C, &'a ScriptedOperator> {
    Driver::with_policy(
        loader,
        HtmlExtractor::new(&site("https://novels.example.com")).unwrap(),
        store,
        operator,
        RetryController::new(Duration::from_millis(1), 5),
        RateLimiter::new(Duration::ZERO),
    )
}

fn titles(units: &[ContentUnit]) -> Vec<&str> {
    units.iter().map(|u| u.title()).collect()
}

#[async_trait]
impl<'a> PageLoader for &'a ScriptedLoader {
    async fn load_page(&self, url: &str) -> Result<Option<String>, FetchError> {
        (**self).load_page(url).await
    }
}

#[tokio::test]
async fn test_crawl_follows_chain_and_checkpoints_each_chapter() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = three_chapters();
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.units), vec!["One", "Two", "Three"]);
    assert_eq!(report.fetched, 3);
    assert_eq!(driver.state(), CrawlState::Done);

    let records = driver.store().rebuild().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].next_url.as_deref(), Some("/c2"));
    assert!(records[2].next_url.is_none());
    assert_eq!(
        records[1].unit.paragraphs().collect::<Vec<_>>(),
        vec!["Text of Two."]
    );
}

#[tokio::test]
async fn test_transient_failures_are_retried_without_duplicates() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = three_chapters().with(
        "/c2",
        vec![Response::Fail, Response::Fail, page("Two", Some("/c3"))],
    );
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.units), vec!["One", "Two", "Three"]);
    assert_eq!(loader.calls_to("/c2"), 3);
    assert_eq!(driver.store().rebuild().unwrap().len(), 3);
    assert!(operator.asked().is_empty());
}

#[tokio::test]
async fn test_missing_page_ends_crawl_with_partial_result() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = three_chapters().with("/c2", vec![Response::Missing]);
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(
        report.outcome,
        CrawlOutcome::Exhausted {
            url: "/c2".to_string()
        }
    );
    assert_eq!(titles(&report.units), vec!["One"]);
    assert_eq!(loader.calls_to("/c2"), 1);
    assert_eq!(loader.calls_to("/c3"), 0);
    assert_eq!(driver.state(), CrawlState::Aborted);

    let records = driver.store().rebuild().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].unit.title(), "One");
}

#[tokio::test]
async fn test_sibling_relative_links_are_followed() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = ScriptedLoader::default()
        .with("/novel/chapter-1", vec![page("One", Some("chapter-2"))])
        .with("/novel/chapter-2", vec![page("Two", None)]);
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver
        .run(Some("/novel/chapter-1".to_string()), Vec::new())
        .await
        .unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.units), vec!["One", "Two"]);
    assert!(operator.asked().is_empty());
}

#[tokio::test]
async fn test_resume_keeps_replayed_prefix() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut log = CheckpointLog::create(dir.path(), "novel").unwrap();
        log.append(&CheckpointRecord::new(
            ContentUnit::new("One", "Text of One.", "/c1"),
            Some("/c2".to_string()),
        ))
        .unwrap();
        log.id().to_string()
    };

    let session = CrawlSession::resume("novel", id, None);
    let prepared = session.prepare(dir.path()).unwrap();
    assert_eq!(prepared.start_url.as_deref(), Some("/c2"));

    let loader = three_chapters();
    let operator = ScriptedOperator::default();
    let mut driver = driver(&loader, prepared.log, &operator);
    let report = driver
        .run(prepared.start_url, prepared.units)
        .await
        .unwrap();

    assert_eq!(titles(&report.units), vec!["One", "Two", "Three"]);
    assert_eq!(report.fetched, 2);
    assert_eq!(loader.calls_to("/c1"), 0);
    assert_eq!(driver.store().rebuild().unwrap().len(), 3);
}

#[tokio::test]
async fn test_long_chain_yields_one_unit_per_page() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "long").unwrap();

    let mut loader = ScriptedLoader::default();
    for i in 1..=25 {
        let next = (i < 25).then(|| format!("/c{}", i + 1));
        loader = loader.with(
            &format!("/c{}", i),
            vec![page(&format!("Chapter {}", i), next.as_deref())],
        );
    }
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(report.units.len(), 25);
    assert_eq!(report.units[24].title(), "Chapter 25");
    assert_eq!(report.units[24].source_url(), "/c25");
}

#[tokio::test]
async fn test_operator_abort_after_repeated_failures() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = three_chapters().with("/c2", vec![Response::Fail]);
    let operator = ScriptedOperator::answering(vec![false]);

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(
        report.outcome,
        CrawlOutcome::OperatorAbort {
            url: "/c2".to_string()
        }
    );
    assert_eq!(titles(&report.units), vec!["One"]);
    // five automatic retries after the first failure
    assert_eq!(loader.calls_to("/c2"), 6);
    assert_eq!(operator.asked(), vec![("/c2".to_string(), 6)]);
    assert_eq!(driver.state(), CrawlState::Aborted);
}

#[tokio::test]
async fn test_failed_retry_prompt_stops_crawl() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let loader = three_chapters().with("/c2", vec![Response::Fail]);
    let operator = ScriptedOperator::without_terminal();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(
        report.outcome,
        CrawlOutcome::OperatorAbort {
            url: "/c2".to_string()
        }
    );
    assert_eq!(titles(&report.units), vec!["One"]);
    assert_eq!(operator.asked().len(), 1);
    assert_eq!(driver.state(), CrawlState::Aborted);
    assert_eq!(driver.store().rebuild().unwrap().len(), 1);
}

#[tokio::test]
async fn test_operator_continue_resumes_at_failing_url() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let mut failures = vec![Response::Fail; 6];
    failures.push(page("Two", Some("/c3")));
    let loader = three_chapters().with("/c2", failures);
    let operator = ScriptedOperator::answering(vec![true]);

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.units), vec!["One", "Two", "Three"]);
    assert_eq!(loader.calls_to("/c2"), 7);
    assert_eq!(operator.asked().len(), 1);
}

#[tokio::test]
async fn test_extraction_failure_is_retried() {
    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let broken = Response::Page("<html><body><p>maintenance</p></body></html>".to_string());
    let loader = three_chapters().with("/c2", vec![broken, page("Two", Some("/c3"))]);
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("/c1".to_string()), Vec::new()).await.unwrap();

    assert_eq!(titles(&report.units), vec!["One", "Two", "Three"]);
    assert_eq!(loader.calls_to("/c2"), 2);
}

#[tokio::test]
async fn test_checkpoint_write_failure_is_fatal() {
    let loader = three_chapters();
    let operator = ScriptedOperator::default();

    let mut driver = driver(&loader, FullDisk, &operator);
    let result = driver.run(Some("/c1".to_string()), Vec::new()).await;

    assert!(matches!(result, Err(ScribeError::Checkpoint(_))));
    // the chain is not advanced past an unsaved chapter
    assert_eq!(loader.calls_to("/c2"), 0);
}

#[tokio::test]
async fn test_blank_start_url_finishes_immediately() {
    let loader = three_chapters();
    let operator = ScriptedOperator::default();
    let saved = vec![ContentUnit::new("One", "Text of One.", "/c1")];

    let dir = TempDir::new().unwrap();
    let log = CheckpointLog::create(dir.path(), "novel").unwrap();
    let mut driver = driver(&loader, log, &operator);
    let report = driver.run(Some("  ".to_string()), saved.clone()).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(report.units, saved);
    assert_eq!(report.fetched, 0);
    assert!(loader.calls.lock().unwrap().is_empty());
}

fn session_config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            request_delay_ms: 0,
            retry_base_delay_ms: 1,
            max_auto_retries: 5,
            request_timeout_secs: 5,
        },
        site: site(base_url),
        user_agent: UserAgentConfig {
            crawler_name: "TestScribe".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            checkpoint_dir: dir.path().join("checkpoints").to_string_lossy().to_string(),
            book_dir: dir.path().join("books").to_string_lossy().to_string(),
            author: "Anon".to_string(),
            format: BookFormat::Html,
        },
    }
}

async fn mount_chapter(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_session_over_http() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = session_config(&server.uri(), &dir);

    mount_chapter(&server, "/novel/c1", chapter("One", "It began.", Some("/novel/c2"))).await;
    mount_chapter(&server, "/novel/c2", chapter("Two", "It went on.", Some("/novel/c3"))).await;
    // c3 is not mounted: wiremock answers 404, which ends the chain

    let session = CrawlSession::new_download("Test Novel", "/novel/c1");
    let operator = ScriptedOperator::default();
    let report = run_session(&config, &session, &operator).await.unwrap();

    assert_eq!(
        report.outcome,
        CrawlOutcome::Exhausted {
            url: "/novel/c3".to_string()
        }
    );
    assert_eq!(titles(&report.units), vec!["One", "Two"]);

    let path = assemble_book(&config.output, &report.units, &session.subject).unwrap();
    let book = std::fs::read_to_string(path).unwrap();
    assert!(book.contains("<h2>One</h2>"));
    assert!(book.contains("<p>It went on.</p>"));
    assert!(!book.contains("Buy now"));
}

#[tokio::test]
async fn test_session_resumes_from_stored_cursor_over_http() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = session_config(&server.uri(), &dir);

    mount_chapter(&server, "/novel/c1", chapter("One", "It began.", Some("/novel/c2"))).await;
    Mock::given(method("GET"))
        .and(path("/novel/c2"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let first = CrawlSession::new_download("Test Novel", "/novel/c1");
    let operator = ScriptedOperator::default();
    run_session(&config, &first, &operator).await.unwrap();

    let checkpoint_dir = std::path::Path::new(&config.output.checkpoint_dir);
    let ids = serial_scribe::checkpoint::list_checkpoints(checkpoint_dir).unwrap();
    assert_eq!(ids.len(), 1);

    // the site publishes chapter two later
    server.reset().await;
    mount_chapter(&server, "/novel/c2", chapter("Two", "It went on.", None)).await;

    let resumed = CrawlSession::resume("Test Novel", ids[0].clone(), None);
    let report = run_session(&config, &resumed, &operator).await.unwrap();

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.units), vec!["One", "Two"]);
    assert_eq!(report.fetched, 1);
}
