//! Sessions that hand out the bearer credential attached to API calls.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::error::{DisplayErrorContext, SdkError};
use aws_sdk_cognitoidentityprovider::types::{AuthFlowType, AuthenticationResultType};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Tokens are refreshed this long before Cognito says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const SIGNED_OUT: &str = "signed out";

#[async_trait]
pub trait Session: Send + Sync {
    /// Current credential, refreshed or signed in as needed.
    async fn bearer_token(&self) -> Result<String>;

    async fn sign_out(&self) -> Result<()>;
}

/// A pre-issued token, for scripted runs.
pub struct StaticSession {
    token: Mutex<Option<String>>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl Session for StaticSession {
    async fn bearer_token(&self) -> Result<String> {
        self.token
            .lock()
            .await
            .clone()
            .ok_or_else(|| Error::Auth(SIGNED_OUT.into()))
    }

    async fn sign_out(&self) -> Result<()> {
        self.token.lock().await.take();
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Tokens {
    id_token: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Instant,
}

impl Tokens {
    fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Debug)]
enum State {
    NotSignedIn,
    Active(Tokens),
    SignedOut,
}

/// User-pool session using the `USER_PASSWORD_AUTH` flow.
pub struct CognitoSession {
    client: aws_sdk_cognitoidentityprovider::Client,
    client_id: String,
    username: String,
    password: String,
    state: Mutex<State>,
}

impl CognitoSession {
    pub async fn connect(
        user_pool_id: &str,
        client_id: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let region = region_of_user_pool(user_pool_id)?;
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .no_credentials()
            .load()
            .await;

        Ok(Self {
            client: aws_sdk_cognitoidentityprovider::Client::new(&config),
            client_id: client_id.into(),
            username: username.into(),
            password: password.into(),
            state: Mutex::new(State::NotSignedIn),
        })
    }

    async fn sign_in(&self) -> Result<Tokens> {
        info!("Signing in as {}", self.username);
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", &self.username)
            .auth_parameters("PASSWORD", &self.password)
            .send()
            .await
            .map_err(sdk_error)?;

        match output.authentication_result() {
            Some(result) => tokens_from(result, None),
            None => Err(Error::Auth(format!(
                "unsupported challenge: {:?}",
                output.challenge_name()
            ))),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Tokens> {
        info!("Refreshing session for {}", self.username);
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .client_id(&self.client_id)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(sdk_error)?;

        let result = output
            .authentication_result()
            .ok_or_else(|| Error::Auth("refresh returned no tokens".into()))?;

        // Cognito does not rotate the refresh token on this flow
        tokens_from(result, Some(refresh_token))
    }
}

#[async_trait]
impl Session for CognitoSession {
    async fn bearer_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        let tokens = match &*state {
            State::SignedOut => return Err(Error::Auth(SIGNED_OUT.into())),
            State::Active(tokens) if tokens.is_fresh(Instant::now()) => {
                return Ok(tokens.id_token.clone())
            }
            State::Active(tokens) => match tokens.refresh_token.clone() {
                Some(refresh_token) => match self.refresh(&refresh_token).await {
                    Ok(tokens) => tokens,
                    Err(err) => {
                        warn!("Refresh failed, signing in again: {}", err);
                        self.sign_in().await?
                    }
                },
                None => self.sign_in().await?,
            },
            State::NotSignedIn => self.sign_in().await?,
        };

        let id_token = tokens.id_token.clone();
        *state = State::Active(tokens);

        Ok(id_token)
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = std::mem::replace(&mut *self.state.lock().await, State::SignedOut);

        let access_token = match previous {
            State::Active(Tokens {
                access_token: Some(access_token),
                ..
            }) => access_token,
            _ => return Ok(()),
        };

        self.client
            .global_sign_out()
            .access_token(access_token)
            .send()
            .await
            .map_err(sdk_error)?;
        info!("Signed out {}", self.username);

        Ok(())
    }
}

/// User-pool ids are `<region>_<id>`.
pub fn region_of_user_pool(user_pool_id: &str) -> Result<String> {
    match user_pool_id.split_once('_') {
        Some((region, id)) if !region.is_empty() && !id.is_empty() => Ok(region.to_string()),
        _ => Err(Error::Config(format!(
            "Malformed user pool id: {}",
            user_pool_id
        ))),
    }
}

fn tokens_from(result: &AuthenticationResultType, refresh_token: Option<&str>) -> Result<Tokens> {
    let id_token = result
        .id_token()
        .ok_or_else(|| Error::Auth("no id token issued".into()))?;

    Ok(Tokens {
        id_token: id_token.to_string(),
        access_token: result.access_token().map(String::from),
        refresh_token: result
            .refresh_token()
            .or(refresh_token)
            .map(String::from),
        expires_at: Instant::now() + lifetime(result.expires_in()),
    })
}

fn lifetime(expires_in: impl Into<Option<i32>>) -> Duration {
    let seconds = expires_in.into().unwrap_or_default().max(0);
    Duration::from_secs(seconds as u64)
}

fn sdk_error<E, R>(err: SdkError<E, R>) -> Error
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::ServiceError(_) => Error::Auth(message),
        _ => Error::Network(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_comes_from_user_pool_id() {
        assert_eq!(
            region_of_user_pool("ap-northeast-2_AbCdEf").unwrap(),
            "ap-northeast-2"
        );
        assert!(region_of_user_pool("AbCdEf").is_err());
        assert!(region_of_user_pool("_AbCdEf").is_err());
    }

    #[test]
    fn token_freshness_respects_margin() {
        let now = Instant::now();
        let tokens = Tokens {
            id_token: "id".into(),
            access_token: None,
            refresh_token: None,
            expires_at: now + Duration::from_secs(3600),
        };
        assert!(tokens.is_fresh(now));
        assert!(!tokens.is_fresh(now + Duration::from_secs(3550)));
    }

    #[test]
    fn lifetime_clamps_negative_values() {
        assert_eq!(lifetime(3600), Duration::from_secs(3600));
        assert_eq!(lifetime(-5), Duration::ZERO);
        assert_eq!(lifetime(None::<i32>), Duration::ZERO);
    }

    #[tokio::test]
    async fn static_session_stops_after_sign_out() {
        let session = StaticSession::new("token");
        assert_eq!(session.bearer_token().await.unwrap(), "token");

        session.sign_out().await.unwrap();
        assert!(matches!(session.bearer_token().await, Err(Error::Auth(_))));
    }
}
