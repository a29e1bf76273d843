// Unit tests for the paginated crawl and its early-stop dedup policy

use crate::common::{page_of_ids, test_source_config, ScriptedPageFetcher};
use gradbridge::source::RecordFetcher;
use std::sync::Arc;

fn fetcher(pages: Vec<String>, max_pages: u32) -> RecordFetcher {
    let client = Arc::new(ScriptedPageFetcher::new(pages));
    RecordFetcher::new(client, &test_source_config(max_pages)).unwrap()
}

#[tokio::test]
async fn test_stops_at_first_previously_ingested_id() {
    let fetcher = fetcher(vec![page_of_ids(&[50, 49, 48, 30, 29])], 10);

    let outcome = fetcher.fetch_new(40).await;

    let ids: Vec<_> = outcome.records.iter().map(|r| r.id.unwrap()).collect();
    assert_eq!(ids, vec![50, 49, 48]);
    assert!(outcome.reached_watermark);
}

#[tokio::test]
async fn test_stop_spans_page_boundaries() {
    let fetcher = fetcher(
        vec![page_of_ids(&[50, 49, 48]), page_of_ids(&[30, 29])],
        10,
    );

    let outcome = fetcher.fetch_new(40).await;

    let ids: Vec<_> = outcome.records.iter().map(|r| r.id.unwrap()).collect();
    assert_eq!(ids, vec![50, 49, 48]);
    assert_eq!(outcome.pages_fetched, 2);
    assert!(outcome.reached_watermark);
}

#[tokio::test]
async fn test_page_cap_bounds_the_crawl() {
    // Every page is full of new ids and the stop condition never fires.
    let pages = vec![
        page_of_ids(&[100, 99]),
        page_of_ids(&[98, 97]),
        page_of_ids(&[96, 95]),
    ];
    let fetcher = fetcher(pages, 2);

    let outcome = fetcher.fetch_new(0).await;

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.pages_fetched, 2);
    assert!(!outcome.reached_watermark);
}

#[tokio::test]
async fn test_transport_error_returns_partial_result() {
    // Only one page is available; the request for page 2 fails.
    let fetcher = fetcher(vec![page_of_ids(&[60, 59])], 10);

    let outcome = fetcher.fetch_new(0).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.pages_fetched, 1);
    assert!(!outcome.reached_watermark);
}

#[tokio::test]
async fn test_empty_page_ends_the_crawl() {
    let empty = "<html><body><table><tbody></tbody></table></body></html>".to_string();
    let fetcher = fetcher(vec![empty, page_of_ids(&[10])], 10);

    let outcome = fetcher.fetch_new(0).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.pages_fetched, 1);
}

#[tokio::test]
async fn test_records_without_ids_do_not_stop_the_crawl() {
    use crate::common::{survey_page, EntryFixture};

    let page = survey_page(&[
        EntryFixture::new(80),
        EntryFixture::new(0).with_link_suffix("see-more"),
        EntryFixture::new(79),
    ]);
    let fetcher = fetcher(vec![page], 10);

    let outcome = fetcher.fetch_new(50).await;

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[1].id, None);
}
