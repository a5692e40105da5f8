use goose::prelude::*;
use serde_json::json;
use std::env;

async fn health_check(user: &mut GooseUser) -> TransactionResult {
    let _goose_metrics = user.get("/healthz").await?;
    Ok(())
}

/// Password hashing dominates this transaction; it is the one worth watching.
async fn login(user: &mut GooseUser) -> TransactionResult {
    let username = env::var("LOADTEST_USERNAME").unwrap_or_else(|_| "loadtest".to_string());
    let password =
        env::var("LOADTEST_PASSWORD").unwrap_or_else(|_| "loadtest-password".to_string());
    let body = json!({ "username": username, "password": password });
    let _goose_metrics = user.post_json("/auth/login", &body).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), GooseError> {
    if env::var("LOADTEST_USERNAME").is_err() {
        println!("No LOADTEST_USERNAME environment variable set, defaulting to 'loadtest'");
    }

    GooseAttack::initialize()?
        .register_scenario(
            scenario!("HealthCheck").register_transaction(transaction!(health_check)),
        )
        .register_scenario(scenario!("Login").register_transaction(transaction!(login)))
        .execute()
        .await?;

    Ok(())
}
