//! Wiring config, adapters and the orchestrator into a running bot.

use crate::duckduckgo::DuckDuckGoSearch;
use crate::openai::OpenAiCompletion;
use crate::supervisor::supervise;
use crate::telegram::{self, TelegramClient};
use anyhow::Context;
use log::{info, warn};
use parley_rs_commands::WebProvider;
use parley_rs_config::{ConfigError, Credentials, ParleyConfig};
use parley_rs_core::{CompletionProvider, Orchestrator, UserLanes};
use parley_rs_memory::MemoryStore;
use std::sync::Arc;
use std::time::Duration;

/// Completion provider for `credentials`, or `None` when no AI key is set.
pub fn completion_provider(
    config: &ParleyConfig,
    credentials: &Credentials,
) -> anyhow::Result<Option<Arc<dyn CompletionProvider>>> {
    let Some(api_key) = credentials.ai_api_key.as_deref() else {
        warn!("no AI api key configured; free-text replies use the basic mode");
        return Ok(None);
    };
    let provider = OpenAiCompletion::new(&config.ai, api_key)
        .context("failed to build completion provider")?;
    info!("completion provider ready (model={})", provider.model());
    Ok(Some(Arc::new(provider)))
}

/// DuckDuckGo search, or `None` if the HTTP client cannot be built.
pub fn web_provider() -> Option<Arc<dyn WebProvider>> {
    match DuckDuckGoSearch::new() {
        Ok(search) => Some(Arc::new(search)),
        Err(err) => {
            warn!("web search disabled (err={})", err);
            None
        }
    }
}

/// Memory store, orchestrator and lanes for the process. Built once; every
/// transport run shares them.
pub fn build_lanes(
    config: &ParleyConfig,
    credentials: &Credentials,
) -> anyhow::Result<Arc<UserLanes>> {
    let memory = Arc::new(MemoryStore::open(
        config.memory_path(),
        config.memory.max_records,
    ));
    let orchestrator = Orchestrator::from_config(
        config,
        memory,
        completion_provider(config, credentials)?,
        web_provider(),
    )
    .context("failed to build orchestrator")?;
    Ok(Arc::new(UserLanes::new(Arc::new(orchestrator))))
}

/// One transport run: poll until failure.
async fn run_once(client: Arc<TelegramClient>, lanes: Arc<UserLanes>) -> anyhow::Result<()> {
    match telegram::serve(client, lanes).await {
        Ok(()) => Ok(()),
        Err(err) if err.is_unauthorized() => Err(ConfigError::Invalid(format!(
            "telegram rejected the bot token: {err}"
        ))
        .into()),
        Err(err) => Err(err).context("telegram polling failed"),
    }
}

/// Validate credentials, then run the transport under the supervisor.
pub async fn run(config: ParleyConfig) -> anyhow::Result<()> {
    let credentials = config.credentials()?;
    let client = Arc::new(
        TelegramClient::new(&config.telegram, &credentials.telegram_token)
            .context("failed to build telegram client")?,
    );
    let lanes = build_lanes(&config, &credentials)?;
    let restart_delay = Duration::from_secs(config.supervisor.restart_delay_secs);
    info!(
        "starting parley (workspace={}, memory={}, restart_delay_secs={})",
        config.workspace_root().display(),
        config.memory_path().display(),
        restart_delay.as_secs()
    );
    supervise(restart_delay, move |attempt| {
        let client = client.clone();
        let lanes = lanes.clone();
        async move {
            if attempt > 1 {
                info!("restarting transport (attempt={})", attempt);
            }
            run_once(client, lanes).await
        }
    })
    .await
}
