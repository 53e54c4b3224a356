use super::*;
use crate::controller::{control_selector, LIKE_MARKER};
use crate::test_support::{feed_page, FeedPage, RecordingStatusSink, StubGenerator};
use commentpilot_config::MemorySettingsStore;
use commentpilot_page::Document;
use commentpilot_protocols::{LanguageStyle, NodeId, Settings, StatusKind};

struct Running {
    session: Session<Document>,
    store: Arc<MemorySettingsStore>,
    status: Arc<RecordingStatusSink>,
    input: NodeId,
    like: NodeId,
}

fn keyed(auto_love: bool) -> Settings {
    Settings {
        api_key: "k".to_string(),
        language_style: LanguageStyle::Friendly,
        auto_love,
    }
}

async fn start(settings: Settings, generator: StubGenerator) -> Running {
    let FeedPage {
        doc, input, like, ..
    } = feed_page();
    let store = Arc::new(MemorySettingsStore::new(settings));
    let status = Arc::new(RecordingStatusSink::default());
    let session = Session::start(
        Arc::new(Mutex::new(doc)),
        &Config::default(),
        store.clone(),
        Arc::new(generator),
        status.clone(),
    )
    .await
    .unwrap();
    Running {
        session,
        store,
        status,
        input,
        like,
    }
}

fn control_count(session: &Session<Document>) -> usize {
    session.page().lock().query_all(&control_selector()).len()
}

fn add_post(session: &Session<Document>) {
    let mut page = session.page().lock();
    let article = page.create_element("div");
    page.set_attribute(article, "role", "article").unwrap();
    let input = page.create_element("div");
    page.set_attribute(input, "contenteditable", "true").unwrap();
    page.set_attribute(input, "role", "textbox").unwrap();
    page.append_child(article, input).unwrap();
    let body = page.body();
    page.append_child(body, article).unwrap();
}

fn click_control(session: &Session<Document>, index: usize) {
    let mut page = session.page().lock();
    let control = page.query_all(&control_selector())[index];
    page.click(control).unwrap();
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[test]
fn test_host_allowed() {
    let hosts = vec!["facebook.com".to_string()];
    assert!(host_allowed("https://facebook.com/", &hosts).unwrap());
    assert!(host_allowed("https://www.facebook.com/groups/1", &hosts).unwrap());
    assert!(host_allowed("https://M.FACEBOOK.COM/", &hosts).unwrap());
    assert!(!host_allowed("https://notfacebook.com/", &hosts).unwrap());
    assert!(!host_allowed("https://example.com/?facebook.com", &hosts).unwrap());
    assert!(host_allowed("https://example.com/", &[]).unwrap());
    assert!(matches!(
        host_allowed("not a url", &hosts),
        Err(SessionError::InvalidUrl(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_disallowed_host_is_rejected() {
    let doc = Document::new("https://example.com/");
    let result = Session::start(
        Arc::new(Mutex::new(doc)),
        &Config::default(),
        Arc::new(MemorySettingsStore::default()),
        Arc::new(StubGenerator::ok("x")),
        Arc::new(RecordingStatusSink::default()),
    )
    .await;
    assert!(matches!(result, Err(SessionError::HostNotAllowed(_))));
}

#[tokio::test(start_paused = true)]
async fn test_page_load_scan_and_click_flow() {
    let r = start(keyed(false), StubGenerator::ok("Thanks for sharing!")).await;
    assert_eq!(r.session.initial_scan().inserted, 1);

    click_control(&r.session, 0);
    settle().await;

    let page = r.session.page().lock();
    assert_eq!(page.text_content(r.input), "Thanks for sharing!");
    assert!(page.page_clicks().is_empty());
    drop(page);
    assert_eq!(r.status.count(StatusKind::Success), 1);

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_new_comment_box_gets_control_after_debounce() {
    let r = start(keyed(false), StubGenerator::ok("x")).await;
    add_post(&r.session);

    settle().await;
    assert_eq!(control_count(&r.session), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(control_count(&r.session), 2);

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_navigation_rescans_immediately() {
    let r = start(keyed(false), StubGenerator::ok("x")).await;
    add_post(&r.session);
    r.session
        .page()
        .lock()
        .navigate("https://www.facebook.com/watch");

    settle().await;
    assert_eq!(control_count(&r.session), 2);

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_manual_scan_request() {
    let r = start(keyed(false), StubGenerator::ok("x")).await;
    add_post(&r.session);
    assert!(r.session.request_scan());

    settle().await;
    assert_eq!(control_count(&r.session), 2);

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_saved_key_is_used_without_restart() {
    let r = start(Settings::default(), StubGenerator::ok("Hello")).await;

    click_control(&r.session, 0);
    settle().await;
    assert_eq!(r.status.count(StatusKind::Error), 1);
    assert_eq!(
        r.status.reports()[0].message,
        "Please set your Gemini API key in the extension settings"
    );

    r.store.set_all(keyed(false)).await.unwrap();
    settle().await;
    assert!(r.session.settings().current().has_api_key());

    click_control(&r.session, 0);
    settle().await;
    assert_eq!(r.status.count(StatusKind::Success), 1);
    assert_eq!(r.session.page().lock().text_content(r.input), "Hello");

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_auto_love_timer_runs_in_session() {
    let r = start(keyed(true), StubGenerator::ok("x")).await;
    settle().await;

    let page = r.session.page().lock();
    assert_eq!(page.page_clicks(), &[r.like]);
    assert_eq!(page.attribute(r.like, LIKE_MARKER).as_deref(), Some("true"));
    drop(page);

    r.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_auto_love_off_leaves_likes_alone() {
    let r = start(keyed(false), StubGenerator::ok("x")).await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(r.session.page().lock().page_clicks().is_empty());
    r.session.shutdown().await;
}
