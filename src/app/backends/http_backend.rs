use crate::core::{
    Client, ClientProfile, ConfigProvider, DashboardStats, EnrollOutcome, MissingEntity, NewClient,
    NewProgram, Program, Registry,
};
use crate::domain::model::{EnrollmentRequest, EnrollmentResponse};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Registry that forwards every operation to a remote registry service.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: Url,
    client: reqwest::Client,
}

/// Body of a 422 answer from the service.
#[derive(Debug, Deserialize)]
struct ValidationBody {
    field: String,
    message: String,
}

/// Any answer the service itself produced carries at least a message.
#[derive(Debug, Deserialize)]
struct MessageBody {
    #[allow(dead_code)]
    message: String,
}

impl HttpRegistry {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::ConfigError {
                message: format!("{} cannot be used as a base URL", base_url),
            });
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_url(), Duration::from_secs(config.timeout_seconds()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::ConfigError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status.is_success() {
            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }

        Err(Self::error_from(response).await)
    }

    async fn error_from(response: Response) -> RegistryError {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return RegistryError::ApiError(e),
        };

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(invalid) = serde_json::from_str::<ValidationBody>(&body) {
                return RegistryError::validation(invalid.field, invalid.message);
            }
        }

        Self::unexpected(status, body)
    }

    fn unexpected(status: StatusCode, body: String) -> RegistryError {
        tracing::warn!("Registry service answered {}: {}", status, body);
        RegistryError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl Registry for HttpRegistry {
    async fn list_clients(&self) -> Result<Vec<Client>> {
        self.get_json(self.endpoint(&["clients"])?).await
    }

    async fn get_client(&self, id: &str) -> Result<Option<ClientProfile>> {
        let url = self.endpoint(&["clients", id])?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::NOT_FOUND {
            return Self::decode(response).await.map(Some);
        }

        // a 404 without the service's JSON body comes from a wrong route or proxy
        let body = response.text().await?;
        match serde_json::from_str::<MessageBody>(&body) {
            Ok(_) => Ok(None),
            Err(_) => Err(Self::unexpected(StatusCode::NOT_FOUND, body)),
        }
    }

    async fn search_clients(&self, query: &str) -> Result<Vec<Client>> {
        let mut url = self.endpoint(&["clients"])?;
        url.query_pairs_mut().append_pair("search", query);
        self.get_json(url).await
    }

    async fn create_client(&self, input: NewClient) -> Result<Client> {
        input.validate()?;

        let url = self.endpoint(&["clients"])?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&input).send().await?;
        let client: Client = Self::decode(response).await?;
        tracing::info!("Created client {} ({})", client.name, client.id);
        Ok(client)
    }

    async fn list_programs(&self) -> Result<Vec<Program>> {
        self.get_json(self.endpoint(&["programs"])?).await
    }

    async fn create_program(&self, input: NewProgram) -> Result<Program> {
        input.validate()?;

        let url = self.endpoint(&["programs"])?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&input).send().await?;
        let program: Program = Self::decode(response).await?;
        tracing::info!("Created program {} ({})", program.name, program.id);
        Ok(program)
    }

    async fn enroll_client(&self, client_id: &str, program_id: &str) -> Result<EnrollOutcome> {
        let url = self.endpoint(&["enrollments"])?;
        let request = EnrollmentRequest {
            client_id: client_id.to_string(),
            program_id: program_id.to_string(),
        };
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&request).send().await?;

        match response.status() {
            StatusCode::CONFLICT => Ok(EnrollOutcome::AlreadyEnrolled),
            StatusCode::NOT_FOUND => {
                let text = response.text().await?;
                let body: EnrollmentResponse = match serde_json::from_str(&text) {
                    Ok(body) => body,
                    Err(_) => return Err(Self::unexpected(StatusCode::NOT_FOUND, text)),
                };
                let missing = body.missing.unwrap_or(if body.message.starts_with("Program") {
                    MissingEntity::Program
                } else {
                    MissingEntity::Client
                });
                Ok(EnrollOutcome::NotFound(missing))
            }
            status if status.is_success() => {
                let body: EnrollmentResponse = response.json().await?;
                body.enrollment.map(EnrollOutcome::Enrolled).ok_or_else(|| {
                    RegistryError::UnexpectedStatus {
                        status: status.as_u16(),
                        body: format!("enrollment missing from response: {}", body.message),
                    }
                })
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    async fn clients_in_program(&self, program_id: &str) -> Result<Vec<Client>> {
        self.get_json(self.endpoint(&["programs", program_id, "clients"])?)
            .await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get_json(self.endpoint(&["dashboard", "stats"])?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let registry =
            HttpRegistry::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();

        let url = registry.endpoint(&["clients", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/clients/a%2Fb%20c");

        let url = registry
            .endpoint(&["programs", "7", "clients"])
            .unwrap();
        assert_eq!(url.path(), "/api/programs/7/clients");
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(HttpRegistry::new("mailto:someone@example.com", Duration::from_secs(5)).is_err());
        assert!(HttpRegistry::new("not a url", Duration::from_secs(5)).is_err());
    }
}
