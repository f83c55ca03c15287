use std::sync::Arc;

use reqwest::{header, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::services::auth::SessionManager;

/// One gateway per resource collection. Mutations always carry the
/// bearer header, even when no token is stored — the client never
/// pre-judges the credential, it issues the call and reacts to the
/// response.
pub struct ApiGateway {
    http: reqwest::Client,
    collection_url: String,
    session: Arc<SessionManager>,
    authenticated_reads: bool,
}

impl ApiGateway {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        collection: &str,
        session: Arc<SessionManager>,
        authenticated_reads: bool,
    ) -> Self {
        Self {
            http,
            collection_url: format!("{}/{}", base_url.trim_end_matches('/'), collection),
            session,
            authenticated_reads,
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            header::AUTHORIZATION,
            format!("Bearer {}", self.session.current_token()),
        )
    }

    pub async fn fetch_all<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut request = self.http.get(&self.collection_url);
        if self.authenticated_reads {
            request = self.authorize(request);
        }
        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status => Err(Error::Remote {
                status: status.as_u16(),
            }),
        }
    }

    pub async fn create<B: Serialize>(&self, body: &B) -> Result<()> {
        let response = self
            .authorize(self.http.post(&self.collection_url))
            .json(body)
            .send()
            .await?;
        self.check_write(response)
    }

    pub async fn update<B: Serialize>(&self, id: i64, body: &B) -> Result<()> {
        let response = self
            .authorize(self.http.put(format!("{}/{}", self.collection_url, id)))
            .json(body)
            .send()
            .await?;
        self.check_write(response)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let response = self
            .authorize(self.http.delete(format!("{}/{}", self.collection_url, id)))
            .send()
            .await?;
        self.check_write(response)
    }

    fn check_write(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        debug!(url = %self.collection_url, %status, "write completed");
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::CONFLICT => Err(Error::Duplicate(
                "the service reported a conflicting record".into(),
            )),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            _ => Err(Error::Remote {
                status: status.as_u16(),
            }),
        }
    }
}
