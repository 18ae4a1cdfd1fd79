//! Cognito Identity Provider HTTP client implementation.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use authkit_core::error::{
    AuthError, Error, InvalidInputError, ProviderError, TransportError,
};
use authkit_core::{PoolEndpoint, Result};

use super::endpoints::{CognitoErrorResponse, TARGET_PREFIX};

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const AMZ_TARGET: &str = "x-amz-target";

/// HTTP client for user pool operations.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    client: reqwest::Client,
    endpoint: PoolEndpoint,
}

impl CognitoClient {
    /// Create a new client for the given endpoint.
    pub fn new(endpoint: PoolEndpoint) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("authkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_transport)?;

        Ok(Self { client, endpoint })
    }

    /// Returns the endpoint this client is configured for.
    pub fn endpoint(&self) -> &PoolEndpoint {
        &self.endpoint
    }

    /// Invoke a user pool operation.
    ///
    /// The body is never logged; most operations carry a password or token.
    #[instrument(skip(self, body), fields(endpoint = %self.endpoint))]
    pub async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        debug!(operation, "Cognito request");

        let payload = serde_json::to_vec(body).map_err(|e| InvalidInputError::Other {
            message: format!("failed to encode {} request: {}", operation, e),
        })?;

        let target = format!("{}.{}", TARGET_PREFIX, operation);

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, HeaderValue::from_static(AMZ_JSON))
            .header(AMZ_TARGET, target)
            .body(payload)
            .send()
            .await
            .map_err(map_transport)?;

        self.handle_response(operation, response).await
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<R> {
        let status = response.status();
        trace!(status = %status, operation, "Cognito response");

        if status.is_success() {
            let bytes = response.bytes().await.map_err(map_transport)?;
            serde_json::from_slice(&bytes).map_err(|e| {
                ProviderError::new(
                    status.as_u16(),
                    Some("InvalidResponse".to_string()),
                    Some(format!("unexpected {} response: {}", operation, e)),
                )
                .into()
            })
        } else {
            Err(self.parse_error_response(response).await)
        }
    }

    /// Parse an error response into the closest typed error.
    async fn parse_error_response(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<CognitoErrorResponse>().await {
            Ok(body) => map_error(status, body.error_type, body.message),
            Err(_) => ProviderError::new(status, None, None).into(),
        }
    }
}

/// Map a Cognito error type to an authkit error.
///
/// `__type` may carry a namespace prefix (`com.amazonaws...#NotAuthorizedException`);
/// only the part after `#` is significant.
pub(crate) fn map_error(status: u16, error_type: Option<String>, message: Option<String>) -> Error {
    let code = error_type
        .as_deref()
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string());
    let text = message.clone().unwrap_or_default();

    let auth = match code.as_deref() {
        Some("NotAuthorizedException") => Some(AuthError::InvalidCredentials(text)),
        Some("UserNotConfirmedException") => Some(AuthError::UserNotConfirmed),
        Some("UserNotFoundException") => Some(AuthError::UserNotFound),
        Some("UsernameExistsException") => Some(AuthError::UsernameExists),
        Some("CodeMismatchException") => Some(AuthError::CodeMismatch),
        Some("ExpiredCodeException") => Some(AuthError::ExpiredCode),
        Some("InvalidPasswordException") => Some(AuthError::PasswordPolicy(text)),
        Some("LimitExceededException") | Some("TooManyRequestsException")
        | Some("TooManyFailedAttemptsException") => Some(AuthError::RateLimited(text)),
        _ => None,
    };

    match auth {
        Some(err) => err.into(),
        None => ProviderError::new(status, code, message).into(),
    }
}

pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    transport.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let endpoint = PoolEndpoint::for_region("us-east-1").unwrap();
        let client = CognitoClient::new(endpoint.clone()).unwrap();
        assert_eq!(client.endpoint(), &endpoint);
    }

    #[test]
    fn maps_namespaced_error_types() {
        let err = map_error(
            400,
            Some("com.amazonaws.cognito#UserNotConfirmedException".to_string()),
            None,
        );
        assert!(matches!(err, Error::Auth(AuthError::UserNotConfirmed)));
    }

    #[test]
    fn unknown_error_types_stay_opaque() {
        let err = map_error(
            500,
            Some("InternalErrorException".to_string()),
            Some("try later".to_string()),
        );
        match err {
            Error::Provider(p) => {
                assert_eq!(p.status, 500);
                assert_eq!(p.error.as_deref(), Some("InternalErrorException"));
                assert_eq!(p.message.as_deref(), Some("try later"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
