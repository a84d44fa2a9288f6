//! HttpTransport against a mock otakudesu

use serde_json::json;
use wajikotakudesu::{Error, HttpTransport, Transport};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::builder()
        .base_url(format!("{}/", server.uri()))
        .user_agent("wajik-tests")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_fetch_page_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/anime/frieren-sub-indo"))
        .and(header("user-agent", "wajik-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Frieren</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport(&mock_server);
    assert_eq!(transport.base_url(), mock_server.uri());

    let body = transport.fetch_page("/anime/frieren-sub-indo").await.unwrap();
    assert_eq!(body, "<h1>Frieren</h1>");
}

#[tokio::test]
async fn test_search_path_hits_site_root() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("s", "one piece"))
        .and(query_param("post_type", "anime"))
        .respond_with(ResponseTemplate::new(200).set_body_string("results"))
        .mount(&mock_server)
        .await;

    let body = transport(&mock_server)
        .fetch_page("?s=one+piece&post_type=anime")
        .await
        .unwrap();
    assert_eq!(body, "results");
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/episode/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let transport = transport(&mock_server);

    let err = transport.fetch_page("/episode/gone").await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 404, .. }));

    let err = transport
        .post_form("/wp-admin/admin-ajax.php", &[("action", "x")])
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn test_post_form_sends_urlencoded_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("id=155468"))
        .and(body_string_contains("q=720p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "abc" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let answer = transport(&mock_server)
        .post_form(
            "/wp-admin/admin-ajax.php",
            &[("id", "155468"), ("i", "0"), ("q", "720p")],
        )
        .await
        .unwrap();
    assert_eq!(answer["data"], "abc");
}

#[tokio::test]
async fn test_invalid_json_answer_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&mock_server)
        .await;

    let err = transport(&mock_server)
        .post_form("/wp-admin/admin-ajax.php", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let result = HttpTransport::builder().base_url("not a url").build();
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}
