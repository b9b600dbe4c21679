mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn lists_only_the_owners_plots_in_id_order() -> Result<()> {
    let server = common::spawn_server().await?;

    let first = server.create_plot("a", "user1").await?;
    server.create_plot("other", "user2").await?;
    let second = server.create_plot("b", "user1").await?;

    let res = server.client.get(server.url("/plots/user1")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let plots = body["data"].as_array().unwrap();
    let ids: Vec<i64> = plots.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![first, second]);

    let plot = &plots[0];
    assert_eq!(plot["plot_name"], "a");
    assert_eq!(plot["plot_geometry"].as_array().unwrap().len(), 5);
    assert_eq!(plot["plot_geometry"][1][0].as_f64(), Some(0.1));
    assert!((plot["plot_area"].as_f64().unwrap() - 0.01).abs() < 1e-12);
    assert!(plot.get("plot_owner").is_none());
    Ok(())
}

#[tokio::test]
async fn user_without_plots_gets_empty_list() -> Result<()> {
    let server = common::spawn_server().await?;

    let body: Value = server.client.get(server.url("/plots/user2")).send().await?.json().await?;
    assert_eq!(body["data"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/plots/nobody")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn pagination_windows_the_list() -> Result<()> {
    let server = common::spawn_server().await?;
    let mut ids = Vec::new();
    for name in ["a", "b", "c", "d"] {
        ids.push(server.create_plot(name, "user1").await?);
    }

    let body: Value = server
        .client
        .get(server.url("/plots/user1?limit=2&offset=1"))
        .send()
        .await?
        .json()
        .await?;
    let page: Vec<i64> = body["data"].as_array().unwrap().iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(page, ids[1..3].to_vec());

    let res = server.client.get(server.url("/plots/user1?limit=-1")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = server.client.get(server.url("/plots/user1?limit=abc")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn default_page_size_only_applies_when_paging() -> Result<()> {
    let mut config = common::test_config();
    config.api.default_page_size = Some(2);
    let server = common::spawn_server_with(config).await?;
    for name in ["a", "b", "c"] {
        server.create_plot(name, "user1").await?;
    }

    let body: Value = server.client.get(server.url("/plots/user1")).send().await?.json().await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let body: Value = server
        .client
        .get(server.url("/plots/user1?offset=0"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    Ok(())
}
