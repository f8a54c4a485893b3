//! Login pass-through. Registration and password flows live elsewhere.

use bazaar_core::{UserId, UserRole, VendorId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiResult, Caller, Envelope, MarketplaceClient};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The user record returned on login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
}

/// A bearer token and who it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: ApiUser,
}

impl MarketplaceClient {
    /// Exchange credentials for a token.
    ///
    /// The guest id is forwarded so the backend can merge the guest cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or `ApiError::Validation` for bad
    /// credentials, or another error if the API request fails.
    #[instrument(skip(self, password, guest_id), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        guest_id: Option<&str>,
    ) -> ApiResult<LoginResponse> {
        let caller = Caller {
            token: None,
            guest_id: guest_id.map(String::from),
        };
        let envelope: Envelope<LoginResponse> = self
            .post(
                "auth/login",
                &caller,
                &LoginRequest {
                    email,
                    password: password.expose_secret(),
                },
            )
            .await?;
        Ok(envelope.data)
    }
}
