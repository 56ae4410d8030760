// Server command implementations
use tracing::info;

use meta_exchange::{api, Config, MetaExchangeResult};

pub async fn start_server(bind: Option<&str>, config: &Config) -> MetaExchangeResult<()> {
    info!(
        "⚙️  Queue limit {}, timeout {} ms, tie break {:?}",
        config.server.queue_limit, config.server.request_timeout_ms, config.planner.tie_break
    );
    api::serve(config, bind).await
}
