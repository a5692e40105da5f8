//! Password grant issuance, bearer validation and SSO tokens.

mod common;

use common::{CLIENT_ID, CLIENT_SECRET, PASSWORD, create_player, test_resources};
use player_auth::{
    entity::{oauth_token, player_sso_token},
    error::ApiError,
    oauth2::{PasswordGrant, TokenIssuer, authenticate},
    sso::SsoTokenService,
    tokens::TOKEN_LENGTH,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use time::Duration;

fn grant<'a>(username: &'a str, password: &'a str) -> PasswordGrant<'a> {
    PasswordGrant {
        client_id: CLIENT_ID,
        client_secret: CLIENT_SECRET,
        username,
        password,
        scope: None,
    }
}

#[tokio::test]
async fn issued_token_resolves_back_to_the_player() {
    let (resources, _) = test_resources().await;
    let player = create_player(&resources.db, "alice", "alice@example.com").await;

    let response = TokenIssuer::new(&resources)
        .issue(grant("alice", PASSWORD))
        .await
        .expect("issue");

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, resources.config.auth.access_token_lifetime);
    assert_eq!(response.scope, "read");

    let header = format!("Bearer {}", response.access_token);
    let identity = authenticate(&resources.db, Some(&header), player_auth::clock::now())
        .await
        .expect("authenticate");
    assert_eq!(identity.player_id, player.id);
    assert_eq!(identity.client_id, CLIENT_ID);
    assert_eq!(identity.scopes, vec!["read".to_string()]);
}

#[tokio::test]
async fn requested_scope_is_kept() {
    let (resources, _) = test_resources().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = TokenIssuer::new(&resources)
        .issue(PasswordGrant {
            scope: Some("read write"),
            ..grant("alice", PASSWORD)
        })
        .await
        .expect("issue");
    assert_eq!(response.scope, "read write");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let (resources, _) = test_resources().await;
    create_player(&resources.db, "alice", "alice@example.com").await;
    let issuer = TokenIssuer::new(&resources);

    let wrong_password = issuer.issue(grant("alice", "not the password")).await;
    let unknown_user = issuer.issue(grant("nobody", PASSWORD)).await;

    let (Err(a), Err(b)) = (wrong_password, unknown_user) else {
        panic!("both attempts must fail");
    };
    assert!(matches!(a, ApiError::InvalidCredentials));
    assert!(matches!(b, ApiError::InvalidCredentials));
    assert_eq!(a.status(), b.status());
    assert_eq!(a.to_string(), b.to_string());

    let count = oauth_token::Entity::find()
        .count(resources.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn bad_client_secret_is_rejected_before_credentials() {
    let (resources, _) = test_resources().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let result = TokenIssuer::new(&resources)
        .issue(PasswordGrant {
            client_secret: "wrong",
            ..grant("alice", PASSWORD)
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidClient)));

    let result = TokenIssuer::new(&resources)
        .issue(PasswordGrant {
            client_id: "99",
            ..grant("alice", PASSWORD)
        })
        .await;
    assert!(matches!(result, Err(ApiError::InvalidClient)));
}

#[tokio::test]
async fn login_issues_under_the_service_client() {
    let (resources, _) = test_resources().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = TokenIssuer::new(&resources)
        .login("alice", PASSWORD)
        .await
        .expect("login");

    let token = oauth_token::Entity::find()
        .filter(oauth_token::Column::AccessToken.eq(&response.access_token))
        .one(resources.db.as_ref())
        .await
        .unwrap()
        .expect("token row");
    // Lowest registered id when none is configured
    assert_eq!(token.client_id, "1");
}

#[tokio::test]
async fn token_validity_window_is_half_open() {
    let (resources, _) = test_resources().await;
    create_player(&resources.db, "alice", "alice@example.com").await;

    let response = TokenIssuer::new(&resources)
        .issue(grant("alice", PASSWORD))
        .await
        .expect("issue");
    let token = oauth_token::Entity::find()
        .filter(oauth_token::Column::AccessToken.eq(&response.access_token))
        .one(resources.db.as_ref())
        .await
        .unwrap()
        .unwrap();

    let header = format!("Bearer {}", response.access_token);
    let expires_at = token.issued_at + Duration::seconds(response.expires_in);

    let just_before =
        authenticate(&resources.db, Some(&header), expires_at - Duration::seconds(1)).await;
    assert!(just_before.is_ok());

    let at_expiry = authenticate(&resources.db, Some(&header), expires_at).await;
    assert!(matches!(at_expiry, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn unknown_and_missing_tokens() {
    let (resources, _) = test_resources().await;
    let now = player_auth::clock::now();

    let missing = authenticate(&resources.db, None, now).await;
    assert!(matches!(missing, Err(ApiError::MissingToken)));

    let unknown = authenticate(&resources.db, Some("Bearer not-a-real-token"), now).await;
    assert!(matches!(unknown, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn sso_token_uses_configured_lifetime() {
    let (resources, _) = test_resources().await;
    let player = create_player(&resources.db, "alice", "alice@example.com").await;
    let service = SsoTokenService::new(&resources);

    let token = service.issue(player.id).await.expect("issue");
    assert_eq!(token.token.len(), TOKEN_LENGTH);
    assert!(token.token.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        token.expires_at - token.created_at,
        Duration::seconds(resources.config.auth.sso_token_lifetime)
    );

    // Not single-use: a second request just creates another row
    let second = service.issue(player.id).await.expect("issue");
    assert_ne!(token.token, second.token);
    let count = player_sso_token::Entity::find()
        .filter(player_sso_token::Column::PlayerId.eq(player.id))
        .count(resources.db.as_ref())
        .await
        .unwrap();
    assert_eq!(count, 2);
}
