//! Cognito-backed identity provider implementation.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use authkit_core::error::{AuthError, InvalidInputError};
use authkit_core::{
    AccessToken, ClientSecret, CodeDelivery, Credentials, IdToken, IdentityProvider, RefreshToken,
    Result, SessionConfig, SignUpOutput, TokenBundle, TokenSet,
};

use crate::api::*;
use crate::secret_hash::secret_hash;

/// An identity provider speaking the Cognito User Pool API.
///
/// Uses the `USER_PASSWORD_AUTH` flow, so the app client must allow it.
#[derive(Debug)]
pub struct CognitoProvider {
    client: CognitoClient,
    client_id: String,
    client_secret: Option<ClientSecret>,
    logins: RwLock<TokenBundle>,
}

impl CognitoProvider {
    /// Create a provider for the pool and app client in `config`.
    ///
    /// # Errors
    ///
    /// Fails if the configured endpoint is not a network URL.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        if !config.endpoint().is_network() {
            return Err(InvalidInputError::PoolEndpoint {
                value: config.endpoint().to_string(),
                reason: "Cognito needs an http(s) endpoint".to_string(),
            }
            .into());
        }

        Ok(Self {
            client: CognitoClient::new(config.endpoint().clone())?,
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().cloned(),
            logins: RwLock::new(TokenBundle::default()),
        })
    }

    fn secret_hash_for(&self, username: &str) -> Result<Option<String>> {
        self.client_secret
            .as_ref()
            .map(|secret| secret_hash(secret, username, &self.client_id))
            .transpose()
    }

    async fn initiate_auth(
        &self,
        flow: &'static str,
        mut parameters: BTreeMap<&'static str, String>,
        username: &str,
    ) -> Result<TokenSet> {
        if let Some(hash) = self.secret_hash_for(username)? {
            parameters.insert("SECRET_HASH", hash);
        }

        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: &self.client_id,
            auth_parameters: parameters,
        };

        let response: InitiateAuthResponse = self.client.call(INITIATE_AUTH, &request).await?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => TokenSet::issued_now(
                AccessToken::new(result.access_token),
                result.id_token.map(IdToken::new),
                result.refresh_token.map(RefreshToken::new),
                result.expires_in,
            )
            .ok_or_else(|| {
                map_error(
                    200,
                    Some("InvalidResponse".to_string()),
                    Some(format!("ExpiresIn out of range: {}", result.expires_in)),
                )
            }),
            (None, Some(challenge)) => {
                warn!(%challenge, "Authentication challenge not supported");
                Err(AuthError::ChallengeRequired(challenge).into())
            }
            (None, None) => Err(map_error(
                200,
                Some("InvalidResponse".to_string()),
                Some("InitiateAuth returned neither tokens nor a challenge".to_string()),
            )),
        }
    }
}

fn delivery(details: Option<CodeDeliveryDetails>) -> CodeDelivery {
    let details = details.unwrap_or_default();
    CodeDelivery {
        destination: details.destination,
        medium: details.delivery_medium,
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenSet> {
        info!("Authenticating");

        let parameters = BTreeMap::from([
            ("USERNAME", credentials.username().to_string()),
            ("PASSWORD", credentials.password().to_string()),
        ]);

        let tokens = self
            .initiate_auth(USER_PASSWORD_AUTH, parameters, credentials.username())
            .await?;

        debug!("Authenticated");
        Ok(tokens)
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn register(&self, credentials: &Credentials) -> Result<SignUpOutput> {
        info!("Registering");

        let request = SignUpRequest {
            client_id: &self.client_id,
            username: credentials.username(),
            password: credentials.password(),
            secret_hash: self.secret_hash_for(credentials.username())?,
            user_attributes: vec![AttributeType {
                name: "email",
                value: credentials.username(),
            }],
        };

        let response: SignUpResponse = self.client.call(SIGN_UP, &request).await?;

        debug!(confirmed = response.user_confirmed, "Registered");
        Ok(SignUpOutput {
            user_sub: response.user_sub,
            confirmed: response.user_confirmed,
            delivery: response.code_delivery_details.map(|d| delivery(Some(d))),
        })
    }

    #[instrument(skip(self, code))]
    async fn confirm_registration(&self, username: &str, code: &str) -> Result<()> {
        let request = ConfirmSignUpRequest {
            client_id: &self.client_id,
            username,
            confirmation_code: code,
            secret_hash: self.secret_hash_for(username)?,
        };

        let _: EmptyResponse = self.client.call(CONFIRM_SIGN_UP, &request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn request_reset(&self, username: &str) -> Result<CodeDelivery> {
        let request = ForgotPasswordRequest {
            client_id: &self.client_id,
            username,
            secret_hash: self.secret_hash_for(username)?,
        };

        let response: ForgotPasswordResponse = self.client.call(FORGOT_PASSWORD, &request).await?;
        Ok(delivery(response.code_delivery_details))
    }

    #[instrument(skip(self, code, new_password))]
    async fn confirm_reset(&self, username: &str, code: &str, new_password: &str) -> Result<()> {
        let request = ConfirmForgotPasswordRequest {
            client_id: &self.client_id,
            username,
            confirmation_code: code,
            password: new_password,
            secret_hash: self.secret_hash_for(username)?,
        };

        let _: EmptyResponse = self
            .client
            .call(CONFIRM_FORGOT_PASSWORD, &request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_tokens(
        &self,
        username: &str,
        refresh_token: &RefreshToken,
    ) -> Result<TokenSet> {
        info!("Refreshing tokens");

        let parameters =
            BTreeMap::from([("REFRESH_TOKEN", refresh_token.as_str().to_string())]);

        self.initiate_auth(REFRESH_TOKEN_AUTH, parameters, username)
            .await
    }

    #[instrument(skip(self, access_token))]
    async fn sign_out(&self, access_token: &AccessToken) -> Result<()> {
        let request = GlobalSignOutRequest {
            access_token: access_token.as_str(),
        };

        let _: EmptyResponse = self.client.call(GLOBAL_SIGN_OUT, &request).await?;
        debug!("Signed out globally");
        Ok(())
    }

    fn set_external_tokens(&self, tokens: TokenBundle) {
        debug!(count = tokens.len(), "Storing external logins");
        *self.logins.write().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    fn external_tokens(&self) -> TokenBundle {
        self.logins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
