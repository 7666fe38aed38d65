use std::sync::Arc;

use cctv_dashboard::app::Dashboard;
use cctv_dashboard::auth::{CognitoSession, Session, StaticSession};
use cctv_dashboard::config::{Args, Config, Credentials};
use cctv_dashboard::fetch::{AuthFetch, HttpFetch};
use cctv_dashboard::poller::{PollSettings, Poller};
use cctv_dashboard::prompts::PromptSelector;
use cctv_dashboard::view::Projector;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_args(Args::parse())?;
    info!("Using API endpoint {}", config.api_endpoint);

    let session: Arc<dyn Session> = match &config.credentials {
        Credentials::Token(token) => Arc::new(StaticSession::new(token.clone())),
        Credentials::Password {
            user_pool_id,
            client_id,
            username,
            password,
        } => Arc::new(
            CognitoSession::connect(user_pool_id, client_id.clone(), username.clone(), password.clone())
                .await?,
        ),
    };
    let fetch: Arc<dyn AuthFetch> = Arc::new(HttpFetch::new(Arc::clone(&session))?);

    let prompts = Arc::new(PromptSelector::new(
        Arc::clone(&fetch),
        config.prompts_url(),
        config.prompt_url(),
    ));
    if let Err(err) = prompts.list().await {
        error!("/prompts error: {}", err);
    }

    let (poller, handle) = Poller::new(
        fetch,
        config.caption_url(),
        Projector::new(config.cloudfront_url.clone()),
        PollSettings::from(&config),
    );

    let dashboard = Dashboard::new(poller, prompts, session);
    let renderer = dashboard.spawn_renderer();

    dashboard.run(BufReader::new(tokio::io::stdin())).await?;

    handle.await?;
    renderer.abort();
    info!("Dashboard stopped");

    Ok(())
}
