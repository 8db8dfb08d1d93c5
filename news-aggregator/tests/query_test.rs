mod common;

use common::*;
use news_aggregator::{filter_articles, Article, NewsFilters, NewsService};
use std::sync::Arc;

fn banking_fixture() -> MockFeedClient {
    let dates: Vec<String> = (2..=6).map(jan).collect();
    MockFeedClient::new()
        .with_feed(
            GENERAL_A,
            rss(&[
                TestItem::new("Commerzbank posts profit", &dates[1]),
                TestItem::new("Ports report busy month", &dates[4]),
                TestItem::new("ING bank lifts outlook", &dates[3]),
            ]),
        )
        .with_feed(
            GENERAL_B,
            rss(&[
                TestItem::new("Rabobank trims costs", &dates[2]),
                TestItem::new("Shipping index flat", &dates[0]),
            ]),
        )
}

fn service(client: MockFeedClient) -> (Arc<MockFeedClient>, NewsService) {
    init_tracing();
    let client = Arc::new(client);
    let clock = Arc::new(ManualClock::new(start_time()));
    let service = NewsService::new(build_aggregator(client.clone(), clock));
    (client, service)
}

#[tokio::test]
async fn sector_filter_with_limit_returns_newest_match() {
    let (_, service) = service(banking_fixture());

    let all = service.query(&NewsFilters::default()).await;
    assert_eq!(all.len(), 5);
    let banking = all.iter().filter(|a| a.sector.as_deref() == Some("Banking")).count();
    assert_eq!(banking, 3);

    let filters = NewsFilters::default().sector("Banking").limit(1);
    let result = service.query(&filters).await;

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].title, "ING bank lifts outlook");
}

#[tokio::test]
async fn sector_filter_ignores_case_but_not_substrings() {
    let (_, service) = service(banking_fixture());

    let lower = service.query(&NewsFilters::default().sector("banking")).await;
    assert_eq!(lower.len(), 3);

    let partial = service.query(&NewsFilters::default().sector("Bank")).await;
    assert!(partial.is_empty());
}

#[tokio::test]
async fn company_filter_searches_company_title_and_description() {
    let d1 = jan(1);
    let d2 = jan(2);
    let d3 = jan(3);
    let client = MockFeedClient::new()
        .with_feed(
            GENERAL_A,
            rss(&[
                TestItem::new("Unilever beats forecasts", &d1),
                TestItem::new("Consumer goods roundup", &d2).description("Shares of unilever rose"),
                TestItem::new("Ports report busy month", &d3),
            ]),
        )
        .with_feed(GENERAL_B, rss(&[]));
    let (_, service) = service(client);

    let result = service.query(&NewsFilters::default().company("UNILEVER")).await;

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|a| a.title != "Ports report busy month"));
}

#[tokio::test]
async fn default_limit_is_twenty() {
    let dates: Vec<String> = (1..=30).map(jan).collect();
    let titles: Vec<String> = (1..=30).map(|i| format!("Bulletin {}", i)).collect();
    let items: Vec<TestItem> = titles.iter().zip(dates.iter()).map(|(t, d)| TestItem::new(t, d)).collect();
    let client = MockFeedClient::new()
        .with_feed(GENERAL_A, rss(&items))
        .with_feed(GENERAL_B, rss(&[]));
    let (_, service) = service(client);

    assert_eq!(service.query(&NewsFilters::default()).await.len(), 20);
    assert_eq!(service.query(&NewsFilters::default().limit(0)).await.len(), 20);
    assert_eq!(service.query(&NewsFilters::default().limit(25)).await.len(), 25);
}

#[tokio::test]
async fn queries_do_not_mutate_the_cached_batch() {
    let (client, service) = service(banking_fixture());

    let narrowed = service.query(&NewsFilters::default().sector("Banking").limit(1)).await;
    assert_eq!(narrowed.len(), 1);

    let all = service.query(&NewsFilters::default()).await;
    assert_eq!(all.len(), 5);
    assert_eq!(client.calls(GENERAL_A), 1);
}

#[tokio::test]
async fn country_filter_selects_scope() {
    let d1 = jan(1);
    let client = MockFeedClient::new()
        .with_feed(GENERAL_A, rss(&[]))
        .with_feed(GENERAL_B, rss(&[]))
        .with_feed(GERMANY, rss(&[TestItem::new("DAX closes flat", &d1)]));
    let (_, service) = service(client);

    let result = service.query(&NewsFilters::for_country("germany")).await;

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].country.as_deref(), Some("germany"));
    assert_eq!(service.scopes(), vec!["germany".to_string()]);
}

#[test]
fn technology_adjacent_sector_is_not_technology() {
    let base = Article {
        id: "1".to_string(),
        title: "Chip maker expands".to_string(),
        description: String::new(),
        url: String::new(),
        source: "Unknown".to_string(),
        published_at: start_time(),
        author: None,
        company: None,
        country: None,
        sector: Some("technology-adjacent".to_string()),
        image_url: None,
    };
    let unset = Article {
        id: "2".to_string(),
        sector: None,
        ..base.clone()
    };
    let exact = Article {
        id: "3".to_string(),
        sector: Some("Technology".to_string()),
        ..base.clone()
    };

    let filters = NewsFilters::default().sector("Technology");
    let result = filter_articles(&[base, unset, exact], &filters, 20);

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, "3");
}
