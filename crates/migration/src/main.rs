use config::Config;
use sea_orm_migration::prelude::*;
use std::env;

#[tokio::main]
async fn main() {
    // Prefer DATABASE_URL, fall back to the service's config.yaml
    if env::var("DATABASE_URL").is_err() {
        let path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
        match Config::builder()
            .add_source(config::File::with_name(&path))
            .build()
        {
            Ok(settings) => {
                if let Ok(url) = settings.get_string("database_url") {
                    env::set_var("DATABASE_URL", url);
                }
            }
            Err(e) => eprintln!("DATABASE_URL not set and {path} could not be read: {e}"),
        }
    }
    cli::run_cli(migration::Migrator).await;
}
