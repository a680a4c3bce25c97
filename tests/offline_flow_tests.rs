use newsdesk::cache::{ArticleStore, SqliteStorage};
use newsdesk::config::{CacheConfig, ProviderConfig};
use newsdesk::connectivity::Connectivity;
use newsdesk::news::{ArticleLookup, Category, NewsClient, NewsCoordinator, NewsResult, Unavailable};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(n: usize, source: &str) -> serde_json::Value {
  serde_json::json!({
    "source": {"id": null, "name": source},
    "author": format!("Reporter {}", n),
    "title": format!("Headline {}", n),
    "description": format!("Summary {}", n),
    "url": format!("https://news.example/{}", n),
    "urlToImage": format!("https://news.example/{}.jpg", n),
    "publishedAt": "2024-10-21T07:28:00Z",
    "content": format!("Body {}", n)
  })
}

fn body(items: Vec<serde_json::Value>) -> serde_json::Value {
  serde_json::json!({"status": "ok", "totalResults": items.len(), "articles": items})
}

async fn provider() -> MockServer {
  let server = MockServer::start().await;

  // Technology-scoped request returns two stories.
  Mock::given(method("GET"))
    .and(path("/v2/top-headlines"))
    .and(query_param("category", "technology"))
    .respond_with(ResponseTemplate::new(200).set_body_json(body(vec![item(1, "Wire"), item(5, "Wire")])))
    .with_priority(1)
    .mount(&server)
    .await;

  // Unscoped request returns all eight.
  Mock::given(method("GET"))
    .and(path("/v2/top-headlines"))
    .respond_with(ResponseTemplate::new(200).set_body_json(body((0..8).map(|n| item(n, "Wire")).collect())))
    .with_priority(5)
    .mount(&server)
    .await;

  server
}

fn client_for(server: &MockServer) -> NewsClient {
  let config = ProviderConfig {
    base_url: format!("{}/v2/top-headlines", server.uri()),
    ..ProviderConfig::default()
  };
  NewsClient::new(&config, "integration-key".into()).unwrap()
}

#[tokio::test]
async fn online_then_offline_reads_the_same_collection_from_disk() {
  let server = provider().await;
  let dir = tempfile::tempdir().unwrap();
  let db = dir.path().join("cache.db");

  {
    let storage = SqliteStorage::open(&db).unwrap();
    let coordinator = NewsCoordinator::new(
      client_for(&server),
      ArticleStore::new(storage, &CacheConfig::default()),
    );

    let result = coordinator
      .load_articles(Some(Category::Technology), Connectivity::Online)
      .await;
    let ids: Vec<_> = result.articles().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["https://news.example/1", "https://news.example/5"]);
  }

  // New process: provider unreachable, cache on disk.
  let storage = SqliteStorage::open(&db).unwrap();
  let coordinator = NewsCoordinator::new(
    client_for(&server),
    ArticleStore::new(storage, &CacheConfig::default()),
  );

  let all = coordinator.load_articles(None, Connectivity::Offline).await;
  assert_eq!(all.articles().len(), 8);

  let technology = coordinator
    .load_articles(Some(Category::Technology), Connectivity::Offline)
    .await;
  assert_eq!(technology.articles().len(), 2);
  assert!(technology
    .articles()
    .iter()
    .all(|a| a.category == Category::Technology));

  match coordinator
    .find_article("https://news.example/3", Connectivity::Offline)
    .await
  {
    ArticleLookup::Found(article) => {
      assert_eq!(article.title, "Headline 3");
      assert_eq!(article.author, "Reporter 3");
    }
    other => panic!("expected cached article, got {:?}", other),
  }
}

#[tokio::test]
async fn provider_outage_is_reported_as_fetch_failure() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let coordinator = NewsCoordinator::new(
    client_for(&server),
    ArticleStore::new(SqliteStorage::in_memory().unwrap(), &CacheConfig::default()),
  );

  let result = coordinator.load_articles(None, Connectivity::Online).await;
  assert_eq!(result, NewsResult::Unavailable(Unavailable::FetchFailed));
  assert!(coordinator.store().load().is_none());

  let offline = coordinator.load_articles(None, Connectivity::Offline).await;
  assert_eq!(offline, NewsResult::Unavailable(Unavailable::NoCache));
}
