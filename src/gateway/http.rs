//! HTTP implementation of the [`Gateway`] over reqwest.
//!
//! Response envelopes follow the server's conventions: list reads wrap
//! their payload in `{results}`, creations return the new record in
//! `{result}`, and everything else acknowledges with `{message}`. Error
//! responses are normalized into [`Error::Api`]: the server's own
//! `{message}`/`{error}` body wins, then a canned per-status message,
//! then a generic fallback.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::{http_error_message, Error, Result};
use crate::gateway::{Ack, Gateway, GatewayConfig};
use crate::types::{
    Collection, CollectionId, CollectionPatch, GameServer, JobAccepted, JobId, JobStatus, ModId,
    ModSubscription, ModSubscriptionPatch, NewCollection, NewModSubscription, NewSchedule,
    Schedule, ScheduleId, SchedulePatch, ServerId,
};

/// List responses arrive as `{results: [...], message}`.
#[derive(Debug, Deserialize)]
struct Listing<T> {
    results: Vec<T>,
}

/// Creation responses arrive as `{result: {...}, message}`.
#[derive(Debug, Deserialize)]
struct Created<T> {
    result: T,
}

/// Best-effort view of an error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Production [`Gateway`] over HTTP.
///
/// # Examples
///
/// ```no_run
/// use garrison_client::gateway::{GatewayConfig, HttpGateway};
/// use url::Url;
///
/// let config = GatewayConfig::new(Url::parse("http://localhost:5000/api").unwrap());
/// let gateway = HttpGateway::new(config).unwrap();
/// # let _ = gateway;
/// ```
#[derive(Debug)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpGateway {
    /// Builds the gateway from a config.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the base URL cannot anchor relative
    /// endpoint paths or the HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let mut base_url = config.base_url;
        // Endpoint paths join relative to the base; without a trailing
        // slash Url::join would drop the last path segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL cannot anchor endpoints: {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Config(err.to_string()))?;

        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| Error::Config(format!("invalid endpoint path '{path}': {err}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    /// Sends the request and normalizes transport and status failures.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        Self::check_status(response).await
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::api_error(status, response).await)
    }

    async fn api_error(status: StatusCode, response: Response) -> Error {
        let status = status.as_u16();
        let body_message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message.or(body.error));
        let message =
            body_message.unwrap_or_else(|| http_error_message(status).to_string());
        Error::Api { status, message }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Decode(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(self.request(method, path)?.json(body)).await?;
        Self::decode(response).await
    }

    async fn send_empty<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        let response = self.send(self.request(method, path)?).await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatus> {
        self.get_json(&format!("async/{job_id}")).await
    }

    async fn list_mods(&self) -> Result<Vec<ModSubscription>> {
        let listing: Listing<ModSubscription> = self.get_json("mod/subscriptions").await?;
        Ok(listing.results)
    }

    async fn add_mods(&self, mods: &[NewModSubscription]) -> Result<Ack> {
        self.send_json(Method::POST, "mod/subscription", &json!({ "mods": mods }))
            .await
    }

    async fn update_mod(&self, id: ModId, patch: &ModSubscriptionPatch) -> Result<Ack> {
        self.send_json(Method::PATCH, &format!("mod/subscription/{id}"), patch)
            .await
    }

    async fn remove_mod(&self, id: ModId) -> Result<Ack> {
        self.send_empty(Method::DELETE, &format!("mod/subscription/{id}"))
            .await
    }

    async fn download_mod(&self, id: ModId) -> Result<JobAccepted> {
        self.send_empty(Method::POST, &format!("mod/{id}/download"))
            .await
    }

    async fn uninstall_mod(&self, id: ModId) -> Result<JobAccepted> {
        self.send_empty(Method::DELETE, &format!("mod/{id}/download"))
            .await
    }

    async fn mod_image(&self, id: ModId) -> Result<Bytes> {
        let response = self
            .send(self.request(Method::GET, &format!("mod/subscription/{id}/image"))?)
            .await?;
        response
            .bytes()
            .await
            .map_err(|err| Error::Transport(err.to_string()))
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let listing: Listing<Collection> = self.get_json("mod/collections").await?;
        Ok(listing.results)
    }

    async fn create_collection(&self, new: &NewCollection) -> Result<Collection> {
        let created: Created<Collection> = self
            .send_json(Method::POST, "mod/collection", new)
            .await?;
        Ok(created.result)
    }

    async fn update_collection(&self, id: CollectionId, patch: &CollectionPatch) -> Result<Ack> {
        self.send_json(Method::PATCH, &format!("mod/collection/{id}"), patch)
            .await
    }

    async fn delete_collection(&self, id: CollectionId) -> Result<Ack> {
        self.send_empty(Method::DELETE, &format!("mod/collection/{id}"))
            .await
    }

    async fn add_collection_mods(&self, id: CollectionId, mods: &[ModId]) -> Result<Ack> {
        self.send_json(
            Method::POST,
            &format!("mod/collection/{id}/mods"),
            &json!({ "mods": mods }),
        )
        .await
    }

    async fn remove_collection_mod(&self, id: CollectionId, mod_id: ModId) -> Result<Ack> {
        self.send_empty(
            Method::DELETE,
            &format!("mod/collection/{id}/mod/{mod_id}"),
        )
        .await
    }

    async fn reorder_collection_mod(
        &self,
        id: CollectionId,
        mod_id: ModId,
        load_order: u32,
    ) -> Result<Ack> {
        self.send_json(
            Method::PATCH,
            &format!("mod/collection/{id}/mod/{mod_id}"),
            &json!({ "load_order": load_order }),
        )
        .await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        let listing: Listing<Schedule> = self.get_json("schedules").await?;
        Ok(listing.results)
    }

    async fn create_schedule(&self, new: &NewSchedule) -> Result<Schedule> {
        let created: Created<Schedule> = self.send_json(Method::POST, "schedule", new).await?;
        Ok(created.result)
    }

    async fn update_schedule(&self, id: ScheduleId, patch: &SchedulePatch) -> Result<Ack> {
        self.send_json(Method::PATCH, &format!("schedule/{id}"), patch)
            .await
    }

    async fn delete_schedule(&self, id: ScheduleId) -> Result<Ack> {
        self.send_empty(Method::DELETE, &format!("schedule/{id}"))
            .await
    }

    async fn toggle_schedule(&self, id: ScheduleId, enabled: bool) -> Result<Ack> {
        self.send_json(
            Method::PATCH,
            &format!("schedule/{id}"),
            &json!({ "enabled": enabled }),
        )
        .await
    }

    async fn execute_schedule(&self, id: ScheduleId) -> Result<JobAccepted> {
        self.send_empty(Method::POST, &format!("schedule/{id}/execute"))
            .await
    }

    async fn list_servers(&self, include_sensitive: bool) -> Result<Vec<GameServer>> {
        let path = if include_sensitive {
            "servers?include_sensitive=true"
        } else {
            "servers"
        };
        let listing: Listing<GameServer> = self.get_json(path).await?;
        Ok(listing.results)
    }

    async fn get_server(&self, id: ServerId) -> Result<GameServer> {
        self.get_json(&format!("server/{id}")).await
    }

    async fn health(&self) -> Result<Ack> {
        self.get_json("health").await
    }
}
