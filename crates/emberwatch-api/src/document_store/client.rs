// Document store HTTP client
//
// Wraps `reqwest::Client` with project-scoped URL construction, API key
// injection, pagination, and Google error envelope unwrapping. Methods
// return plain wire types -- conversion to domain entities happens in core.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::models::{Document, ErrorEnvelope, Fields, ListDocumentsResponse};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Public REST endpoint, used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1/";

const PAGE_SIZE: &str = "300";

/// Raw HTTP client for a project's default Firestore database.
pub struct DocumentStoreClient {
    http: reqwest::Client,
    base_url: Url,
    project_id: String,
    api_key: SecretString,
}

impl DocumentStoreClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` overrides the public endpoint (emulators, tests); `None`
    /// uses [`DEFAULT_BASE_URL`].
    pub fn new(
        base_url: Option<Url>,
        project_id: String,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        Ok(Self::with_client(http, base_url, project_id, api_key))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        project_id: String,
        api_key: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            project_id,
            api_key,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Operations ───────────────────────────────────────────────────

    /// List every document in `collection`, following pagination.
    pub async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, Error> {
        let url = self.documents_url(collection, None)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_owned())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            trace!(%url, "listing documents");
            let resp = self
                .http
                .get(url.clone())
                .query(&[("key", self.api_key.expose_secret())])
                .query(&query)
                .send()
                .await?;
            let page: ListDocumentsResponse = parse_response(resp).await?;
            documents.extend(page.documents);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(collection, count = documents.len(), "listed documents");
        Ok(documents)
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<Document, Error> {
        let url = self.documents_url(collection, None)?;
        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&Document::from_fields(fields))
            .send()
            .await?;
        let doc: Document = parse_response(resp).await?;
        if doc.id().is_none() {
            return Err(Error::MissingDocumentName);
        }
        debug!(collection, id = doc.id(), "created document");
        Ok(doc)
    }

    /// Overwrite the fields named in `update_mask` on an existing document.
    ///
    /// The request is conditional on the document existing, so patching a
    /// deleted id fails instead of silently recreating it.
    pub async fn patch_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        update_mask: &[&str],
    ) -> Result<Document, Error> {
        let url = self.documents_url(collection, Some(id))?;
        let mut query: Vec<(&str, &str)> = update_mask
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        query.push(("currentDocument.exists", "true"));

        let resp = self
            .http
            .patch(url)
            .query(&[("key", self.api_key.expose_secret())])
            .query(&query)
            .json(&Document::from_fields(fields))
            .send()
            .await?;
        let doc = parse_response(resp).await?;
        debug!(collection, id, "patched document");
        Ok(doc)
    }

    /// Delete a document. Deleting a missing id is not an error.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.documents_url(collection, Some(id))?;
        let resp = self
            .http
            .delete(url)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }
        debug!(collection, id, "deleted document");
        Ok(())
    }

    // ── URL construction ─────────────────────────────────────────────

    fn documents_url(&self, collection: &str, id: Option<&str>) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty().extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
            ]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Build a `DocumentStore` error, preferring the envelope's message.
fn error_from_body(status: u16, body: &str) -> Error {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{code}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.is_empty() => format!("HTTP {status}"),
        Err(_) => body.to_owned(),
    };
    Error::DocumentStore { status, message }
}
