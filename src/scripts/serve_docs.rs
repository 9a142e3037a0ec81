use anyhow::{Context, Result};
use railbi_portable::config::AppConfig;
use railbi_portable::docs_server::DocsServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let mut config = AppConfig::load()?;
    if let Some(arg) = std::env::args().nth(1) {
        config.docs.port = arg.parse().context("port must be a number")?;
    }

    let mut server = DocsServer::new(&config.docs_dir());
    let address = server.start(&config.docs_address()).await?;
    println!("Serving docs on http://{} with CORS (Ctrl-C to stop)", address);

    tokio::signal::ctrl_c().await?;
    server.stop();

    Ok(())
}
