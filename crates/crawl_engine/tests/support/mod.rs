#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use crawl_engine::{CrawlEvent, ProgressSink};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GATE_PATH: &str = "/member/ageauth/";
pub const CONFIRM_PATH: &str = "/member/ageauth/confirm";
pub const AUTH_COOKIE: &str = "age_check_done=1";

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<CrawlEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<CrawlEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: CrawlEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

/// Mounts a consent gate whose confirmation link sets the verification cookie.
pub async fn mount_gate(server: &MockServer) {
    let gate_url = format!("{}{}", server.uri(), GATE_PATH);
    Mock::given(method("GET"))
        .and(path(GATE_PATH))
        .respond_with(html(format!(
            r#"<html><body>
                <p>18歳以上ですか？</p>
                <a class="btn btn-ageauth-no" href="https://www.example.org/">いいえ</a>
                <a class="btn btn-ageauth-yes" href="{}{}?r=%2Fidol%2F">はい</a>
            </body></html>"#,
            server.uri(),
            CONFIRM_PATH
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(CONFIRM_PATH))
        .and(header("referer", gate_url.as_str()))
        .respond_with(
            html("<html><body>ok</body></html>")
                .insert_header("Set-Cookie", format!("{AUTH_COOKIE}; Path=/").as_str()),
        )
        .mount(server)
        .await;
}

/// Serves `body` at `route` only to requests carrying the verification cookie.
pub async fn mount_protected(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("cookie", AUTH_COOKIE))
        .respond_with(response)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_raw("<html><body>age check required</body></html>", "text/html"),
        )
        .with_priority(10)
        .mount(server)
        .await;
}
