mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn owner_updates_name_and_geometry() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({
            "plot_name": "plot100",
            "plot_geometry": "0.0 0.0, 0.2 0.0, 0.2 0.2, 0.0 0.2, 0.0 0.0",
            "password": "password_1234"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["plot_name"], "plot100");
    assert_eq!(body["data"]["plot_owner"], "user1");

    let listed: Value = server.client.get(server.url("/plots/user1")).send().await?.json().await?;
    let plot = &listed["data"][0];
    assert_eq!(plot["plot_name"], "plot100");
    assert!((plot["plot_area"].as_f64().unwrap() - 0.04).abs() < 1e-12);
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_other_fields() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({ "plot_name": "renamed", "password": "password_1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = server.plots_of("user1").await?;
    assert_eq!(stored[0].name, "renamed");
    assert_eq!(stored[0].geometry.coordinates()[2], [0.1, 0.1]);
    Ok(())
}

#[tokio::test]
async fn bad_credentials_never_mutate() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;
    let before = server.plots_of("user1").await?;
    let url = server.url(&format!("/plots/user1/{}", id));

    // Wrong password, another user's password, and no credential at all
    for body in [
        json!({ "plot_name": "stolen", "password": "password" }),
        json!({ "plot_name": "stolen", "password": "password_abcd" }),
        json!({ "plot_name": "stolen" }),
    ] {
        let res = server.client.patch(&url).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
    let res = server.client.delete(&url).json(&json!({ "password": "password" })).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert_eq!(server.plots_of("user1").await?, before);
    Ok(())
}

#[tokio::test]
async fn malformed_geometry_leaves_plot_untouched() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;
    let before = server.plots_of("user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({
            "plot_name": "plot100",
            "plot_geometry": "0 0, 1 0, 1 1, 0 1",
            "password": "password_1234"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.plots_of("user1").await?, before);
    Ok(())
}

#[tokio::test]
async fn owner_cannot_be_changed() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({ "plot_owner": "user2", "password": "password_1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(server.plots_of("user1").await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_plots_are_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user2").await?;

    let patch = json!({ "plot_name": "x", "password": "password_1234" });
    // user1 asking for user2's plot through their own path
    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&patch)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.patch(server.url("/plots/user1/not-a-number")).json(&patch).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn owner_deletes_plot() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;
    server.create_plot("plot2", "user1").await?;
    let before = server.plot_count().await?;

    let res = server
        .client
        .delete(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({ "password": "password_1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.plot_count().await?, before - 1);
    assert!(server.plots_of("user1").await?.iter().all(|p| p.id != id));

    // Already gone
    let res = server
        .client
        .delete(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({ "password": "password_1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

async fn fetch_token(server: &common::TestServer, username: &str, password: &str) -> Result<String> {
    let res = server
        .client
        .post(server.url("/token_delivery/"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "token request failed: {}", res.status());
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["token_type"], "Bearer");
    Ok(body["data"]["token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn bearer_tokens_authorize_the_owner_only() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;
    let url = server.url(&format!("/plots/user1/{}", id));

    let user2_token = fetch_token(&server, "user2", "password_abcd").await?;
    let res = server
        .client
        .patch(&url)
        .bearer_auth(&user2_token)
        .json(&json!({ "plot_name": "stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .patch(&url)
        .bearer_auth("not.a.token")
        .json(&json!({ "plot_name": "stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let user1_token = fetch_token(&server, "user1", "password_1234").await?;
    let res = server
        .client
        .patch(&url)
        .bearer_auth(&user1_token)
        .json(&json!({ "plot_name": "plot100" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // No body needed for a token-authorized delete
    let res = server.client.delete(&url).bearer_auth(&user1_token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.plot_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn token_delivery_rejects_bad_requests() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server
        .client
        .post(server.url("/token_delivery/"))
        .json(&json!({ "username": "user1", "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/token_delivery/"))
        .json(&json!({ "username": "user1" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn password_only_deployments_have_no_token_route() -> Result<()> {
    let mut config = common::test_config();
    config.security.credential_mode = plots_api::config::CredentialMode::Password;
    let server = common::spawn_server_with(config).await?;

    let res = server
        .client
        .post(server.url("/token_delivery/"))
        .json(&json!({ "username": "user1", "password": "password_1234" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn mutation_auth_can_be_disabled() -> Result<()> {
    let mut config = common::test_config();
    config.security.require_auth_for_mutation = false;
    let server = common::spawn_server_with(config).await?;
    let id = server.create_plot("plot1", "user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .json(&json!({ "plot_name": "open" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn basic_auth_authorizes_the_owner_only() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;
    let url = server.url(&format!("/plots/user1/{}", id));

    let res = server
        .client
        .patch(&url)
        .basic_auth("user1", Some("password_1234"))
        .json(&json!({ "plot_name": "plot100" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["plot_name"], "plot100");

    let res = server
        .client
        .patch(&url)
        .basic_auth("user2", Some("password_abcd"))
        .json(&json!({ "plot_name": "stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .patch(&url)
        .basic_auth("user1", Some("password"))
        .json(&json!({ "plot_name": "stolen" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.plots_of("user1").await?[0].name, "plot100");

    let res = server
        .client
        .delete(&url)
        .basic_auth("user1", Some("password_1234"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(server.plot_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_authorization_scheme_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let id = server.create_plot("plot1", "user1").await?;

    let res = server
        .client
        .patch(server.url(&format!("/plots/user1/{}", id)))
        .header("authorization", "Digest username=\"user1\"")
        .json(&json!({ "plot_name": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
