use async_trait::async_trait;
use reqwest::{header, redirect, Client, Response, StatusCode};
use shared::{
    domain::{ImageRecord, Settings},
    error::ApiFailure,
    protocol::{
        AckResponse, ImagesResponse, SettingsResponse, StatusResponse, UpdateSettingsRequest,
    },
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod error;
pub mod live;
pub mod view;

pub use error::{ClientError, FormError};

/// Read and command surface of the dashboard API. Controllers depend on this
/// seam so they can be driven by the real client or by a test stub.
#[async_trait]
pub trait ApiHandle: Send + Sync {
    async fn fetch_settings(&self) -> Result<Settings, ClientError>;
    async fn fetch_images(&self, limit: u32) -> Result<Vec<ImageRecord>, ClientError>;
    async fn fetch_status(&self) -> Result<StatusResponse, ClientError>;
    async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<(), ClientError>;
    async fn post_now(&self) -> Result<(), ClientError>;
}

/// HTTP client for the dashboard API. Keeps the session cookie issued by
/// `/auth/login` in its jar; redirects are never followed so authentication
/// outcomes stay observable as statuses.
pub struct DashboardClient {
    http: Client,
    server_url: String,
}

impl DashboardClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self, ClientError> {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&server_url).map_err(|_| ClientError::InvalidServerUrl(server_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidServerUrl(server_url));
        }

        let http = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { http, server_url })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Form login against `/auth/login`. The server answers with a redirect
    /// either into the dashboard (session cookie set) or back to the login
    /// page when the credentials are wrong.
    pub async fn login(&self, user: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.server_url))
            .form(&[("user", user), ("password", password)])
            .send()
            .await?;

        match response.status() {
            StatusCode::FOUND | StatusCode::SEE_OTHER => {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default();
                if location.starts_with("/login") {
                    return Err(ClientError::InvalidCredentials);
                }
                debug!("login: session established for {user}");
                Ok(())
            }
            status => Err(ClientError::UnexpectedStatus {
                endpoint: "/auth/login",
                status: status.as_u16(),
            }),
        }
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/auth/logout", self.server_url))
            .send()
            .await?;
        guard("/auth/logout", response).await?;
        Ok(())
    }
}

/// Maps the API's status conventions onto the client error taxonomy. 401 is
/// the only proactively handled class; everything else surfaces as a typed
/// error rather than an unhandled rejection.
async fn guard(endpoint: &'static str, response: Response) -> Result<Response, ClientError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::FORBIDDEN => {
            let reason = response
                .json::<ApiFailure>()
                .await
                .map(|failure| failure.error)
                .unwrap_or_else(|_| "forbidden".to_string());
            Err(ClientError::Forbidden(reason))
        }
        status if status.is_success() => Ok(response),
        status => Err(ClientError::UnexpectedStatus {
            endpoint,
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl ApiHandle for DashboardClient {
    async fn fetch_settings(&self) -> Result<Settings, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/settings", self.server_url))
            .send()
            .await?;
        let body: SettingsResponse = guard("/api/settings", response).await?.json().await?;
        Ok(body.settings)
    }

    async fn fetch_images(&self, limit: u32) -> Result<Vec<ImageRecord>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/images", self.server_url))
            .query(&[("limit", limit)])
            .send()
            .await?;
        let body: ImagesResponse = guard("/api/images", response).await?.json().await?;
        Ok(body.images)
    }

    async fn fetch_status(&self) -> Result<StatusResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/status", self.server_url))
            .send()
            .await?;
        Ok(guard("/api/status", response).await?.json().await?)
    }

    async fn update_settings(&self, request: UpdateSettingsRequest) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/settings", self.server_url))
            .json(&request)
            .send()
            .await?;
        let _: AckResponse = guard("/api/settings", response).await?.json().await?;
        Ok(())
    }

    async fn post_now(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/post-now", self.server_url))
            .send()
            .await?;
        let _: AckResponse = guard("/api/post-now", response).await?.json().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
