use assert_matches::assert_matches;
use gsheets_mcp::api::TokenProvider;
use gsheets_mcp::api::auth::CredentialsFile;
use gsheets_mcp::errors::SheetsError;
use mockito::Matcher;
use serde_json::json;

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn service_account(server: &mockito::ServerGuard) -> CredentialsFile {
    serde_json::from_value(json!({
        "type": "service_account",
        "project_id": "demo-project",
        "private_key_id": "key-1",
        "private_key": PRIVATE_KEY,
        "client_email": "bot@demo-project.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", server.url())
    }))
    .expect("service account json")
}

fn authorized_user(server: &mockito::ServerGuard) -> CredentialsFile {
    serde_json::from_value(json!({
        "type": "authorized_user",
        "client_id": "cid.apps.googleusercontent.com",
        "client_secret": "shh",
        "refresh_token": "1//refresh",
        "token_uri": format!("{}/token", server.url())
    }))
    .expect("authorized user json")
}

fn provider_for(credentials: CredentialsFile) -> TokenProvider {
    TokenProvider::from_credentials(credentials, reqwest::Client::new())
}

fn token_body(token: &str, expires_in: i64) -> String {
    json!({ "access_token": token, "expires_in": expires_in, "token_type": "Bearer" }).to_string()
}

#[tokio::test(flavor = "current_thread")]
async fn service_account_exchanges_signed_assertion_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".into(),
                "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
            ),
            Matcher::Regex(r"assertion=[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(token_body("ya29.service", 3600))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_for(service_account(&server));
    assert_eq!(provider.kind(), "service_account");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.service");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.service");

    mock.assert_async().await;
}

#[tokio::test(flavor = "current_thread")]
async fn authorized_user_uses_refresh_grant_at_configured_uri() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("client_id".into(), "cid.apps.googleusercontent.com".into()),
            Matcher::UrlEncoded("client_secret".into(), "shh".into()),
            Matcher::UrlEncoded("refresh_token".into(), "1//refresh".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(token_body("ya29.user", 3600))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_for(authorized_user(&server));
    assert_eq!(provider.kind(), "authorized_user");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.user");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.user");

    mock.assert_async().await;
}

#[tokio::test(flavor = "current_thread")]
async fn token_inside_expiry_skew_is_exchanged_again() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .with_header("content-type", "application/json")
        .with_body(token_body("ya29.short", 30))
        .expect(2)
        .create_async()
        .await;

    let provider = provider_for(authorized_user(&server));
    provider.access_token().await.unwrap();
    provider.access_token().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_exchange_is_an_auth_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let provider = provider_for(authorized_user(&server));
    let err = provider.access_token().await.unwrap_err();
    assert_matches!(err, SheetsError::Auth(ref message) if message.contains("invalid_grant"));
}

#[tokio::test(flavor = "current_thread")]
async fn absurd_lifetime_does_not_panic() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/token")
        .with_header("content-type", "application/json")
        .with_body(token_body("ya29.forever", i64::MAX))
        .expect(1)
        .create_async()
        .await;

    let provider = provider_for(authorized_user(&server));
    assert_eq!(provider.access_token().await.unwrap(), "ya29.forever");
    assert_eq!(provider.access_token().await.unwrap(), "ya29.forever");

    mock.assert_async().await;
}
