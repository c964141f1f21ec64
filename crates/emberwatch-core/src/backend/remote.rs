// ── Hosted backend ──
//
// Emergencies live in a document-store collection; the alert position is a
// single realtime-database record. Both feeds are driven by polling at the
// configured interval and only yield when the content actually changed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{FutureExt, StreamExt};
use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

use emberwatch_api::{DocumentStoreClient, RealtimeClient, TransportConfig};

use super::{AlertFeed, Backend, EmergencyFeed};
use crate::config::{BackendConfig, MIN_POLL_INTERVAL};
use crate::convert::{alert_from_record, emergencies_from_documents, fields_for_new, status_fields};
use crate::error::CoreError;
use crate::model::{AlertSignal, Emergency, EmergencyId, EmergencyStatus, NewEmergency};

/// Backend backed by the hosted document store and realtime database.
pub struct RemoteBackend {
    documents: Arc<DocumentStoreClient>,
    realtime: Option<Arc<RealtimeClient>>,
    collection: String,
    alert_record: String,
    poll_interval: Duration,
}

impl RemoteBackend {
    /// Build HTTP clients for the configured project. Performs no I/O.
    pub fn new(config: &BackendConfig) -> Result<Self, CoreError> {
        let missing = config.missing_parameters();
        if !missing.is_empty() {
            return Err(CoreError::ConfigurationMissing {
                missing: missing.join(", "),
            });
        }
        let (Some(api_key), Some(project_id)) = (&config.api_key, &config.project_id) else {
            return Err(CoreError::Internal("credentials vanished after check".into()));
        };

        let transport = TransportConfig::with_timeout(config.timeout);
        let documents = DocumentStoreClient::new(
            config.document_store_url.clone(),
            project_id.clone(),
            SecretString::from(api_key.expose_secret().to_owned()),
            &transport,
        )?;
        let realtime = config
            .database_url
            .clone()
            .map(|url| RealtimeClient::new(url, None, &transport))
            .transpose()?;

        Ok(Self {
            documents: Arc::new(documents),
            realtime: realtime.map(Arc::new),
            collection: config.collection.clone(),
            alert_record: config.alert_record.clone(),
            poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
        })
    }

    /// Delete every stored emergency and write `records` in their place.
    ///
    /// Returns `(removed, created)`.
    pub async fn replace_all(&self, records: Vec<NewEmergency>) -> Result<(usize, usize), CoreError> {
        let existing = self.documents.list_documents(&self.collection).await?;
        let mut removed = 0;
        for doc in &existing {
            let Some(id) = doc.id() else { continue };
            self.documents.delete_document(&self.collection, id).await?;
            removed += 1;
        }

        let mut created = 0;
        for new in &records {
            let doc = self
                .documents
                .create_document(&self.collection, fields_for_new(new))
                .await?;
            trace!(name = %doc.name, "seeded emergency");
            created += 1;
        }

        info!(removed, created, collection = %self.collection, "replaced emergency collection");
        Ok((removed, created))
    }

    fn ticker(every: Duration) -> tokio::time::Interval {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}

impl Backend for RemoteBackend {
    fn connect(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        async move {
            // One read proves the project, key and collection are usable.
            let docs = self
                .documents
                .list_documents(&self.collection)
                .await
                .map_err(|e| CoreError::ConnectionFailed {
                    reason: e.to_string(),
                })?;
            debug!(
                project = self.documents.project_id(),
                count = docs.len(),
                "document store reachable"
            );
            Ok(())
        }
        .boxed()
    }

    fn emergency_feed(&self) -> EmergencyFeed {
        let client = Arc::clone(&self.documents);
        let collection = self.collection.clone();
        let every = self.poll_interval;

        Box::pin(async_stream::stream! {
            let mut ticker = Self::ticker(every);
            let mut last: Option<Vec<Emergency>> = None;
            loop {
                ticker.tick().await;
                match client.list_documents(&collection).await {
                    Ok(docs) => {
                        let snapshot = emergencies_from_documents(docs);
                        if last.as_ref() != Some(&snapshot) {
                            last = Some(snapshot.clone());
                            yield Ok(snapshot);
                        }
                    }
                    Err(e) => {
                        yield Err(CoreError::StreamError { message: e.to_string() });
                    }
                }
            }
        })
    }

    fn alert_feed(&self) -> AlertFeed {
        let Some(client) = self.realtime.clone() else {
            debug!("no realtime database configured; alert record is absent");
            return futures_util::stream::once(async { Ok(None) }).boxed();
        };
        let path = self.alert_record.clone();
        let every = self.poll_interval;

        Box::pin(async_stream::stream! {
            let mut ticker = Self::ticker(every);
            let mut last: Option<Option<AlertSignal>> = None;
            loop {
                ticker.tick().await;
                let polled = client
                    .get_record(&path)
                    .await
                    .map_err(|e| CoreError::StreamError { message: e.to_string() })
                    .and_then(alert_from_record);
                match polled {
                    Ok(signal) => {
                        if last.as_ref() != Some(&signal) {
                            last = Some(signal.clone());
                            yield Ok(signal);
                        }
                    }
                    Err(e) => {
                        // Force the next good read through after a failure.
                        last = None;
                        yield Err(e);
                    }
                }
            }
        })
    }

    fn create_emergency(&self, new: NewEmergency) -> BoxFuture<'_, Result<EmergencyId, CoreError>> {
        async move {
            let doc = self
                .documents
                .create_document(&self.collection, fields_for_new(&new))
                .await?;
            let id = doc.id().ok_or_else(|| CoreError::OperationFailed {
                message: "created document has no id".into(),
            })?;
            debug!(%id, kind = %new.kind, "created emergency");
            Ok(EmergencyId::new(id))
        }
        .boxed()
    }

    fn update_status(
        &self,
        id: EmergencyId,
        status: EmergencyStatus,
    ) -> BoxFuture<'_, Result<(), CoreError>> {
        async move {
            self.documents
                .patch_document(&self.collection, id.as_str(), status_fields(status), &["status"])
                .await
                .map_err(|e| match CoreError::from(e) {
                    CoreError::NotFound { .. } => CoreError::NotFound { id: id.to_string() },
                    other => other,
                })?;
            debug!(%id, %status, "updated emergency status");
            Ok(())
        }
        .boxed()
    }
}
