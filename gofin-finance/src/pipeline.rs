//! Text -> model -> normalized batch -> one atomic write.

use chrono_tz::Tz;
use serde_json::Value;
use tracing::{error, info};

use gofin_core::{CanonicalTransaction, Clock, IngestError};
use gofin_ingest::{build_prompt, parse_reply, ModelClient};
use gofin_store::{DemoAccount, SqliteStore};

use crate::batch::filter_batch;
use crate::classify::FallbackPolicy;
use crate::endpoint::{IngestRequest, IngestResponse};
use crate::normalize::{normalize, NormalizeContext};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Timezone "today" and midday are computed in
    pub timezone: Tz,
    pub fallback: FallbackPolicy,
    pub demo: DemoAccount,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::Sao_Paulo,
            fallback: FallbackPolicy::default(),
            demo: DemoAccount::default(),
        }
    }
}

/// Stateless between calls; the store is lent per request.
pub struct IngestPipeline<C, K> {
    client: C,
    clock: K,
    settings: PipelineSettings,
}

impl<C: ModelClient, K: Clock> IngestPipeline<C, K> {
    pub fn new(client: C, clock: K, settings: PipelineSettings) -> Self {
        Self {
            client,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one request end to end. Either every extracted record is
    /// committed or none is.
    pub async fn ingest(
        &self,
        store: &mut SqliteStore,
        request: &IngestRequest,
        api_key: Option<&str>,
    ) -> Result<Vec<CanonicalTransaction>, IngestError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(IngestError::Validation("text is empty".to_string()));
        }

        let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            error!("model API key is not configured");
            return Err(IngestError::Configuration);
        };

        let now = self.clock.now();
        let prompt = build_prompt(text, now, self.settings.timezone);

        let raw = self.client.complete(api_key, &prompt).await?;
        let reply = parse_reply(&raw)?;

        let ctx = NormalizeContext {
            text,
            now,
            tz: self.settings.timezone,
            fallback: self.settings.fallback,
        };
        let items = reply
            .transactions
            .iter()
            .map(|raw| normalize(raw, &ctx))
            .collect();
        let batch = filter_batch(items)?;

        let user_id = store.resolve_user(request.user_id.as_deref(), &self.settings.demo)?;
        let created = store.insert_batch(&user_id, &batch)?;

        info!(
            user_id = %user_id,
            extracted = reply.transactions.len(),
            created = created.len(),
            "ingested transactions"
        );
        Ok(created)
    }

    /// Endpoint adapter: decoded JSON body in, status + JSON body out.
    pub async fn handle(
        &self,
        store: &mut SqliteStore,
        body: &Value,
        api_key: Option<&str>,
    ) -> IngestResponse {
        let res = match IngestRequest::from_json(body) {
            Ok(req) => self.ingest(store, &req, api_key).await,
            Err(e) => Err(e),
        };
        IngestResponse::from_result(res)
    }
}
