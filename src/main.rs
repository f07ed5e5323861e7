use baas_dispatch::core::config::{Credentials, GlobalConfig};
use baas_dispatch::core::types::RequestDescriptor;
use baas_dispatch::Dispatcher;
use reqwest::Method;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Reads BAAS_APP_ID / BAAS_APP_KEY / BAAS_MASTER_KEY and BAAS_API_SERVER,
    // from a .env file when present.
    let credentials = Credentials::from_env_file("BAAS")?;
    let config = GlobalConfig::from_env("BAAS")?;

    let dispatcher = Dispatcher::builder(credentials)
        .with_config(config)
        .build()?;

    println!("Fetching server time...");
    match dispatcher
        .send(RequestDescriptor::new(Method::GET, "/date").with_body(None))
        .await
    {
        Ok(date) => println!("Server time: {}", date),
        Err(e) => println!("Error fetching server time: {}", e),
    }

    Ok(())
}
