use crawl_engine::{harvest_item_urls, Document, LinkRules, DEFAULT_ITEM_MARKER};
use pretty_assertions::assert_eq;

const BASE: &str = "https://www.sokmil.com";

fn rules() -> LinkRules {
    LinkRules::new(BASE, DEFAULT_ITEM_MARKER).unwrap()
}

fn harvest(markup: &str) -> Vec<String> {
    let doc = Document::parse("https://www.sokmil.com/idol/", markup);
    harvest_item_urls(&doc, &rules()).into_vec()
}

#[test]
fn keeps_matching_anchors_only_and_dedupes() {
    let urls = harvest(
        r#"<html><body>
            <a href="/idol/_item/item100/">one</a>
            <a href="/idol/ranking/">ranking</a>
            <a href="https://www.sokmil.com/idol/_item/item200/">two</a>
            <a href="/idol/_item/item100/"><img src="thumb.jpg"></a>
            <a href="/member/login/">login</a>
            <a href="/idol/_item/item300/">three</a>
        </body></html>"#,
    );
    assert_eq!(
        urls,
        vec![
            "https://www.sokmil.com/idol/_item/item100/".to_string(),
            "https://www.sokmil.com/idol/_item/item200/".to_string(),
            "https://www.sokmil.com/idol/_item/item300/".to_string(),
        ]
    );
}

#[test]
fn root_relative_href_is_base_plus_href_exactly() {
    let hrefs = [
        "/idol/_item/item1",
        "/idol/_item/item2/?ref=list&page=2",
        "/idol/_item/item3/#reviews",
    ];
    let markup: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{href}">x</a>"#))
        .collect();
    let urls = harvest(&markup);
    let expected: Vec<String> = hrefs.iter().map(|href| format!("{BASE}{href}")).collect();
    assert_eq!(urls, expected);
}

#[test]
fn output_has_no_relative_urls_or_duplicates() {
    let urls = harvest(
        r#"
        <a href="../idol/_item/item5/">page-relative</a>
        <a href="//www.sokmil.com/idol/_item/item6/">scheme-relative</a>
        <a href="/idol/_item/item5/">root</a>
        <a href="https://www.sokmil.com/idol/_item/item5/">absolute</a>
        "#,
    );
    assert_eq!(
        urls,
        vec![
            "https://www.sokmil.com/idol/_item/item5/".to_string(),
            "https://www.sokmil.com//www.sokmil.com/idol/_item/item6/".to_string(),
        ]
    );
    for url in &urls {
        assert!(url.starts_with("https://"));
    }
}

#[test]
fn trailing_slash_on_base_is_ignored() {
    let rules = LinkRules::new("https://www.sokmil.com/", DEFAULT_ITEM_MARKER).unwrap();
    assert_eq!(rules.base_host(), BASE);
    assert_eq!(
        rules.item_url("/idol/_item/item9", None),
        Some("https://www.sokmil.com/idol/_item/item9".to_string())
    );
}

#[test]
fn page_without_items_yields_empty_set() {
    assert!(harvest("<p>nothing here</p><a>no href</a>").is_empty());
}

#[test]
fn double_slash_href_stays_on_base_host() {
    let urls = harvest(r#"<a href="//cdn.other.example/idol/_item/item6/">elsewhere</a>"#);
    assert_eq!(
        urls,
        vec!["https://www.sokmil.com//cdn.other.example/idol/_item/item6/".to_string()]
    );
}
