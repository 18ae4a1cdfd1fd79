//! Cognito Identity Provider operation names and request/response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Operation Names
// ============================================================================

/// Target prefix for every user pool operation.
pub const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

pub const INITIATE_AUTH: &str = "InitiateAuth";
pub const SIGN_UP: &str = "SignUp";
pub const CONFIRM_SIGN_UP: &str = "ConfirmSignUp";
pub const FORGOT_PASSWORD: &str = "ForgotPassword";
pub const CONFIRM_FORGOT_PASSWORD: &str = "ConfirmForgotPassword";
pub const GLOBAL_SIGN_OUT: &str = "GlobalSignOut";

/// `InitiateAuth` flow for plain username and password.
pub const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

/// `InitiateAuth` flow exchanging a refresh token.
pub const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

// ============================================================================
// Request/Response Types
// ============================================================================

// No Debug: carries a secret.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthRequest<'a> {
    pub auth_flow: &'a str,
    pub client_id: &'a str,
    pub auth_parameters: BTreeMap<&'static str, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateAuthResponse {
    #[serde(default)]
    pub authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    pub challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeType<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

// No Debug: carries a secret.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
    pub user_attributes: Vec<AttributeType<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignUpResponse {
    pub user_confirmed: bool,
    pub user_sub: String,
    #[serde(default)]
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CodeDeliveryDetails {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub delivery_medium: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmSignUpRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub confirmation_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForgotPasswordRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ForgotPasswordResponse {
    #[serde(default)]
    pub code_delivery_details: Option<CodeDeliveryDetails>,
}

// No Debug: carries a secret.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfirmForgotPasswordRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub confirmation_code: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_hash: Option<String>,
}

// No Debug: carries a secret.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalSignOutRequest<'a> {
    pub access_token: &'a str,
}

/// Body of operations that answer with `{}`.
#[derive(Debug, Deserialize)]
pub struct EmptyResponse {}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct CognitoErrorResponse {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}
