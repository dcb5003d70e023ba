//! Cosmos REST client
//!
//! Implements [`DatabaseService`] over the Cosmos DB REST API with `reqwest`.
//! Only the calls provisioning needs are exposed: reading the database
//! account (used to verify the endpoint and key), creating a database, and
//! creating a hash-partitioned container.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Serialize;

use crate::config::{ConnectionConfig, Settings};
use crate::cosmos::auth::{http_date, MasterKey};
use crate::cosmos::models::{ContainerDefinition, DatabaseAccount, DatabaseDefinition, ErrorBody};
use crate::error::ServiceError;
use crate::provisioner::DatabaseService;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for one Cosmos account endpoint
#[derive(Debug, Clone)]
pub struct CosmosClient {
    /// HTTP client
    http: Client,

    /// Account endpoint, ending in `/`
    endpoint: Url,

    key: MasterKey,

    /// `x-ms-version` header value
    api_version: String,

    verify_tls: bool,
}

impl CosmosClient {
    /// Build a client without contacting the service.
    ///
    /// When `config` disables verification, invalid server certificates are
    /// accepted (the emulator ships a self-signed one).
    pub fn new(config: &ConnectionConfig, settings: &Settings) -> Result<Self, ServiceError> {
        let key = MasterKey::from_base64(config.key())?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.verify_tls())
            .build()?;

        if !config.verify_tls() {
            tracing::debug!(endpoint = %config.endpoint(), "TLS certificate verification disabled");
        }

        Ok(Self {
            http,
            endpoint: config.endpoint().clone(),
            key,
            api_version: settings.api_version.clone(),
            verify_tls: config.verify_tls(),
        })
    }

    /// Build a client and verify the endpoint accepts the key.
    ///
    /// Fails with [`ServiceError::Unauthorized`] on a rejected key and
    /// [`ServiceError::Connection`] when the endpoint cannot be reached.
    pub async fn connect(config: &ConnectionConfig, settings: &Settings) -> Result<Self, ServiceError> {
        let client = Self::new(config, settings)?;
        let account = client.read_account().await?;

        tracing::info!(
            endpoint = %client.endpoint,
            account = account.id.as_deref().unwrap_or("unknown"),
            verify_tls = client.verify_tls,
            "Connected to database service"
        );

        Ok(client)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Read the database account (`GET /`)
    pub async fn read_account(&self) -> Result<DatabaseAccount, ServiceError> {
        let response = self
            .send(Method::GET, "", "", "", None::<&()>)
            .await?;
        let response = check_status(response, "database account").await?;
        let body = response.text().await?;

        // The account document is informational only
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        resource_type: &str,
        resource_link: &str,
        body: Option<&B>,
    ) -> Result<Response, ServiceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self
            .endpoint
            .join(path)
            .map_err(|e| ServiceError::InvalidRequest(format!("{}: {}", path, e)))?;

        let date = http_date(Utc::now());
        let authorization = self
            .key
            .authorization(method.as_str(), resource_type, resource_link, &date);

        tracing::trace!(method = %method, url = %url, resource_type, resource_link, "Sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", self.api_version.as_str());

        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(classify_transport_error)
    }
}

#[async_trait]
impl DatabaseService for CosmosClient {
    async fn create_database(&self, id: &str) -> Result<(), ServiceError> {
        let body = DatabaseDefinition { id };
        let response = self
            .send(Method::POST, "dbs", "dbs", "", Some(&body))
            .await?;
        check_status(response, &format!("dbs/{}", id)).await?;
        Ok(())
    }

    async fn create_container(
        &self,
        database: &str,
        id: &str,
        partition_key_path: &str,
    ) -> Result<(), ServiceError> {
        let resource_link = format!("dbs/{}", database);
        let path = format!("dbs/{}/colls", urlencoding::encode(database));
        let body = ContainerDefinition::hash_partitioned(id, partition_key_path);

        let response = self
            .send(Method::POST, &path, "colls", &resource_link, Some(&body))
            .await?;
        check_status(response, &format!("{}/colls/{}", resource_link, id)).await?;
        Ok(())
    }
}

/// Map a non-success response onto [`ServiceError`]
async fn check_status(response: Response, resource: &str) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or(text);

    tracing::debug!(status = %status, resource = %resource, message = %message, "Request rejected");

    Err(match status {
        StatusCode::CONFLICT => ServiceError::AlreadyExists(resource.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(message),
        _ => ServiceError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn classify_transport_error(e: reqwest::Error) -> ServiceError {
    // A rejected certificate will not go away by waiting for the service
    if is_tls_failure(&e) {
        return ServiceError::Http(e);
    }
    if e.is_connect() || e.is_timeout() {
        // reqwest's Display already includes the source chain
        ServiceError::Connection(e.to_string())
    } else {
        ServiceError::Http(e)
    }
}

/// rustls surfaces handshake and certificate errors as `InvalidData` I/O errors
fn is_tls_failure(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(e);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::InvalidData {
                return true;
            }
            // io::Error::source skips a directly wrapped io::Error
            let wrapped = io.get_ref().and_then(|inner| inner.downcast_ref::<std::io::Error>());
            if wrapped.is_some_and(|inner| inner.kind() == std::io::ErrorKind::InvalidData) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
