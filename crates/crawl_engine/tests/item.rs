mod support;

use std::fs;

use crawl_engine::{
    CrawlConfig, CrawlEvent, DownloadTask, FailureKind, ItemError, ItemProcessor,
    MediaDownloader, Session,
};
use support::{html, mount_gate, mount_protected, TestSink};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    server: MockServer,
    downloads: TempDir,
    downloader: MediaDownloader,
}

impl Fixture {
    async fn start() -> Self {
        let server = MockServer::start().await;
        mount_gate(&server).await;
        let downloads = TempDir::new().unwrap();
        let config = CrawlConfig {
            download_dir: downloads.path().join("mp4"),
            ..CrawlConfig::for_site(&server.uri())
        };
        let session = Session::establish(
            &config.gate_url,
            &config.confirm_selector,
            config.fetch.clone(),
        )
        .await
        .unwrap();
        let downloader = MediaDownloader::from_config(session, &config).unwrap();
        Self {
            server,
            downloads,
            downloader,
        }
    }

    fn dir(&self) -> std::path::PathBuf {
        self.downloads.path().join("mp4")
    }

    fn task(&self, route: &str) -> DownloadTask {
        DownloadTask {
            index: 1,
            total: 1,
            page_url: format!("{}{}", self.server.uri(), route),
            referer: None,
        }
    }

    async fn mount_item(&self, route: &str, media_url: &str) {
        mount_protected(
            &self.server,
            route,
            html(format!(
                r#"<html><body><div id="player"></div>
                <script>
                  var flashvars = {{ video_id: '511685', video_url: '{media_url}', preview: 1 }};
                </script></body></html>"#
            )),
        )
        .await;
    }
}

#[tokio::test]
async fn downloads_media_named_by_file_token() {
    let fx = Fixture::start().await;
    let media_url = format!("{}/sample/play?f=abc123.mp4&q=hd", fx.server.uri());
    fx.mount_item("/idol/_item/item511685/", &media_url).await;
    Mock::given(method("GET"))
        .and(path("/sample/play"))
        .and(header("cookie", support::AUTH_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8; 4096], "video/mp4"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let sink = TestSink::new();
    let outcome = fx
        .downloader
        .process(&fx.task("/idol/_item/item511685/"), &sink)
        .await
        .expect("item processed");

    assert_eq!(outcome.file_name, "abc123.mp4");
    assert_eq!(outcome.media_url, media_url);
    assert_eq!(outcome.bytes_written, 4096);
    assert_eq!(outcome.path, fx.dir().join("abc123.mp4"));
    assert_eq!(fs::read(&outcome.path).unwrap(), vec![1u8; 4096]);

    let requests = fx.server.received_requests().await.unwrap();
    let media_request = requests
        .iter()
        .find(|request| request.url.path() == "/sample/play")
        .expect("media requested");
    assert!(media_request.headers.get("referer").is_none());

    assert_eq!(
        sink.take(),
        vec![
            CrawlEvent::DownloadStarted {
                index: 1,
                file_name: "abc123.mp4".into()
            },
            CrawlEvent::DownloadCompleted {
                index: 1,
                file_name: "abc123.mp4".into(),
                bytes: 4096
            },
        ]
    );
}

#[tokio::test]
async fn falls_back_to_item_id_name() {
    let fx = Fixture::start().await;
    let media_url = format!("{}/stream/master.mp4", fx.server.uri());
    fx.mount_item("/idol/_item/item511685/", &media_url).await;
    Mock::given(method("GET"))
        .and(path("/stream/master.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("mp4", "video/mp4"))
        .mount(&fx.server)
        .await;

    let outcome = fx
        .downloader
        .process(&fx.task("/idol/_item/item511685/"), &TestSink::new())
        .await
        .unwrap();
    assert_eq!(outcome.file_name, "item511685.mp4");
    assert!(fx.dir().join("item511685.mp4").is_file());
}

#[tokio::test]
async fn page_without_media_url_fails_without_touching_disk() {
    let fx = Fixture::start().await;
    mount_protected(
        &fx.server,
        "/idol/_item/item42/",
        html("<html><body><p>sold out</p></body></html>"),
    )
    .await;

    let sink = TestSink::new();
    let err = fx
        .downloader
        .process(&fx.task("/idol/_item/item42/"), &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, ItemError::MediaUrlNotFound { .. }));
    assert_eq!(err.failure().kind, FailureKind::MediaUrlNotFound);
    assert!(!fx.dir().exists());
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn media_http_error_leaves_no_partial_file() {
    let fx = Fixture::start().await;
    let media_url = format!("{}/sample/play?f=broken.mp4", fx.server.uri());
    fx.mount_item("/idol/_item/item7/", &media_url).await;
    Mock::given(method("GET"))
        .and(path("/sample/play"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fx.server)
        .await;

    let err = fx
        .downloader
        .process(&fx.task("/idol/_item/item7/"), &TestSink::new())
        .await
        .unwrap_err();
    match &err {
        ItemError::Media(fetch) => assert_eq!(fetch.kind, FailureKind::HttpStatus(404)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read_dir(fx.dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn page_fetch_error_is_reported() {
    let fx = Fixture::start().await;
    Mock::given(method("GET"))
        .and(path("/idol/_item/item8/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&fx.server)
        .await;

    let err = fx
        .downloader
        .process(&fx.task("/idol/_item/item8/"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.failure().kind, FailureKind::HttpStatus(503));
}
