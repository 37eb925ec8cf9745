//! HTTP client for the aggregator API.
//!
//! Every endpoint is a JSON POST with the client credentials in the body.
//! Non-2xx responses carry a structured error object whose `error_message`
//! is surfaced to callers.

use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;

use super::types::{
    InstitutionsGetByIdResponse, ItemGetResponse, ItemPublicTokenExchangeResponse,
    LinkTokenCreateResponse, TransactionsSyncResponse,
};

/// Request timeout for aggregator calls.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Errors returned by the aggregator client.
#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    /// The request never produced a response (connect failure, timeout,
    /// or a malformed body on a 2xx response).
    #[error("request to aggregator failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The aggregator rejected the request with a structured error body.
    ///
    /// Displays as the aggregator's own `error_message`, which is what
    /// clients of this service see in sync/link failure responses.
    #[error("{message}")]
    Api {
        error_type: String,
        error_code: String,
        message: String,
    },

    /// Non-2xx response whose body could not be decoded as an error object.
    #[error("aggregator returned HTTP {0}")]
    Status(u16),
}

/// Structured error body returned by the aggregator on failure.
#[derive(Debug, serde::Deserialize)]
struct PlaidApiError {
    #[serde(default)]
    error_type: String,

    #[serde(default)]
    error_code: String,

    #[serde(default)]
    error_message: String,
}

/// Client for the aggregator REST API.
///
/// Cheap to clone; the inner `reqwest::Client` is an `Arc` around a
/// connection pool.
#[derive(Debug, Clone)]
pub struct PlaidClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    secret: String,
    client_name: String,
}

impl PlaidClient {
    /// Build a client from application configuration.
    pub fn new(config: &Config) -> Result<Self, PlaidError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: config.plaid_environment.base_url().to_string(),
            client_id: config.plaid_client_id.clone(),
            secret: config.plaid_secret.clone(),
            client_name: config.plaid_client_name.clone(),
        })
    }

    /// Create a link token for the client-side Link widget.
    ///
    /// The authenticated user's id becomes `client_user_id` so the
    /// aggregator can correlate link sessions per user.
    pub async fn create_link_token(
        &self,
        client_user_id: &str,
    ) -> Result<LinkTokenCreateResponse, PlaidError> {
        #[derive(Serialize)]
        struct User<'a> {
            client_user_id: &'a str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            secret: &'a str,
            client_name: &'a str,
            user: User<'a>,
            products: [&'a str; 1],
            country_codes: [&'a str; 1],
            language: &'a str,
        }

        self.post(
            "/link/token/create",
            &Request {
                client_id: &self.client_id,
                secret: &self.secret,
                client_name: &self.client_name,
                user: User { client_user_id },
                products: ["transactions"],
                country_codes: ["US"],
                language: "en",
            },
        )
        .await
    }

    /// Exchange a temporary public token for a durable access token.
    pub async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<ItemPublicTokenExchangeResponse, PlaidError> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            secret: &'a str,
            public_token: &'a str,
        }

        self.post(
            "/item/public_token/exchange",
            &Request {
                client_id: &self.client_id,
                secret: &self.secret,
                public_token,
            },
        )
        .await
    }

    /// Fetch item metadata (used to discover the institution id).
    pub async fn get_item(&self, access_token: &str) -> Result<ItemGetResponse, PlaidError> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            secret: &'a str,
            access_token: &'a str,
        }

        self.post(
            "/item/get",
            &Request {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
            },
        )
        .await
    }

    /// Look up an institution's display name by id.
    pub async fn get_institution(
        &self,
        institution_id: &str,
    ) -> Result<InstitutionsGetByIdResponse, PlaidError> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            secret: &'a str,
            institution_id: &'a str,
            country_codes: [&'a str; 1],
        }

        self.post(
            "/institutions/get_by_id",
            &Request {
                client_id: &self.client_id,
                secret: &self.secret,
                institution_id,
                country_codes: ["US"],
            },
        )
        .await
    }

    /// Fetch one page of the incremental change feed.
    ///
    /// Pass `None` as the cursor on the very first sync of an item; the
    /// feed then starts from the beginning of available history.
    pub async fn transactions_sync(
        &self,
        access_token: &str,
        cursor: Option<&str>,
    ) -> Result<TransactionsSyncResponse, PlaidError> {
        #[derive(Serialize)]
        struct Request<'a> {
            client_id: &'a str,
            secret: &'a str,
            access_token: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            cursor: Option<&'a str>,
        }

        self.post(
            "/transactions/sync",
            &Request {
                client_id: &self.client_id,
                secret: &self.secret,
                access_token,
                cursor,
            },
        )
        .await
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// On a non-2xx status the body is decoded as the aggregator's error
    /// object; if that fails too, only the status code is reported.
    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, PlaidError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resp>().await?);
        }

        match response.json::<PlaidApiError>().await {
            Ok(err) => {
                tracing::warn!(
                    "Aggregator error on {path}: {} ({})",
                    err.error_code,
                    err.error_message
                );
                Err(PlaidError::Api {
                    error_type: err.error_type,
                    error_code: err.error_code,
                    message: err.error_message,
                })
            }
            Err(_) => Err(PlaidError::Status(status.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_aggregator_message() {
        let err = PlaidError::Api {
            error_type: "ITEM_ERROR".to_string(),
            error_code: "ITEM_LOGIN_REQUIRED".to_string(),
            message: "the login details of this item have changed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the login details of this item have changed"
        );
    }

    #[test]
    fn error_body_tolerates_missing_fields() {
        let err: PlaidApiError = serde_json::from_str("{}").unwrap();
        assert_eq!(err.error_message, "");
        assert_eq!(err.error_code, "");
        assert_eq!(err.error_type, "");
    }
}
