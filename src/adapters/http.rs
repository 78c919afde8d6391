use crate::core::{
    ConfigProvider, GroupId, OwnershipSubmission, SubmitResponse, UnitId, UnitPage, UnitsApi,
};
use crate::utils::error::{Result, SelectorError};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

/// `UnitsApi` over the dashboard's REST backend.
#[derive(Debug, Clone)]
pub struct HttpUnitsApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpUnitsApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        validate_url("api.base_url", base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(
            config.api_base_url(),
            config.api_token().map(str::to_string),
            Duration::from_secs(config.timeout_seconds()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn units_url(&self, group: GroupId) -> String {
        format!("{}/groups/{}/units", self.base_url, group)
    }

    fn ownership_url(&self, group: GroupId) -> String {
        format!("{}/groups/{}/units/ownership", self.base_url, group)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("API error response ({}): {}", status, body);
        Err(SelectorError::HttpStatusError {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl UnitsApi for HttpUnitsApi {
    async fn list_units_page(
        &self,
        group: GroupId,
        offset: usize,
        limit: usize,
    ) -> Result<UnitPage> {
        let url = self.units_url(group);
        tracing::debug!("GET {} offset={} limit={}", url, offset, limit);

        let request = self
            .client
            .get(&url)
            .query(&[("offset", offset), ("limit", limit)]);
        let response = self.authorize(request).send().await?;
        let response = Self::ensure_success(response).await?;

        Ok(response.json::<UnitPage>().await?)
    }

    async fn submit_ownership(
        &self,
        group: GroupId,
        unit_ids: &[UnitId],
    ) -> Result<SubmitResponse> {
        let url = self.ownership_url(group);
        tracing::debug!("PUT {} with {} unit id(s)", url, unit_ids.len());

        let body = OwnershipSubmission {
            unit_ids: unit_ids.to_vec(),
        };
        let request = self.client.put(&url).json(&body);
        let response = self.authorize(request).send().await?;
        let response = Self::ensure_success(response).await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(SubmitResponse {
                message: format!("Ownership updated for {} unit(s)", unit_ids.len()),
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let result = HttpUnitsApi::new("not a url", None, Duration::from_secs(5));
        assert!(matches!(
            result,
            Err(SelectorError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let api = HttpUnitsApi::new("https://crm.example.com/api/", None, Duration::from_secs(5))
            .unwrap();
        assert_eq!(api.units_url(7), "https://crm.example.com/api/groups/7/units");
        assert_eq!(
            api.ownership_url(7),
            "https://crm.example.com/api/groups/7/units/ownership"
        );
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let api = HttpUnitsApi::new(
            "https://crm.example.com",
            Some("  ".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(api.token.is_none());
    }
}
