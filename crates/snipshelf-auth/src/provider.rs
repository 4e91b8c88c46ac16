//! Identity providers and the OAuth authorization-code handoff.
//!
//! Sign-in goes through the provider's authorize page and comes back with a
//! `code`, which [`IdentityProvider::exchange`] turns into a [`User`]. The
//! network side lives in [`OAuthClient`]; [`StaticIdentity`] stands in for it
//! in tests.

use crate::error::{AuthError, AuthResult};
use crate::session::User;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use serde::{Deserialize, Serialize};
use snipshelf_util::Error;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("snipshelf/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Github,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Google, Provider::Github];

    pub fn id(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Github => "GitHub",
        }
    }

    pub fn authorize_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            Provider::Github => "https://github.com/login/oauth/authorize",
        }
    }

    pub fn token_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Github => "https://github.com/login/oauth/access_token",
        }
    }

    pub fn profile_endpoint(&self) -> &'static str {
        match self {
            Provider::Google => "https://openidconnect.googleapis.com/v1/userinfo",
            Provider::Github => "https://api.github.com/user",
        }
    }

    pub fn scope(&self) -> &'static str {
        match self {
            Provider::Google => "openid email profile",
            Provider::Github => "read:user user:email",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unknown_variant("provider", s, &["google", "github"]))
    }
}

/// OAuth client credentials registered with a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Random value tying a callback to the sign-in that started it.
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..16).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Build the provider's authorize URL.
pub fn build_auth_url(
    provider: Provider,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> AuthResult<String> {
    let url = url::Url::parse_with_params(
        provider.authorize_endpoint(),
        &[
            ("response_type", "code"),
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", provider.scope()),
            ("state", state),
        ],
    )?;
    Ok(url.into())
}

/// Turns an authorization code into a signed-in user.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Providers that can be offered on the sign-in page.
    fn providers(&self) -> Vec<Provider>;

    /// Where to send the browser to start signing in.
    fn authorize_url(&self, provider: Provider, redirect_uri: &str, state: &str)
        -> AuthResult<String>;

    async fn exchange(
        &self,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<User>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleProfile {
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubProfile {
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

/// Talks to the real providers over HTTPS.
pub struct OAuthClient {
    http: reqwest::Client,
    credentials: HashMap<Provider, ClientCredentials>,
}

impl OAuthClient {
    pub fn new(credentials: HashMap<Provider, ClientCredentials>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    fn credentials(&self, provider: Provider) -> AuthResult<&ClientCredentials> {
        self.credentials
            .get(&provider)
            .ok_or_else(|| AuthError::NotConfigured(provider.id().to_string()))
    }

    async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<String> {
        let creds = self.credentials(provider)?;
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(provider.token_endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange(text));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("invalid token response: {e}")))?;
        Ok(tokens.access_token)
    }

    async fn fetch_profile(&self, provider: Provider, access_token: &str) -> AuthResult<User> {
        let response = self
            .http
            .get(provider.profile_endpoint())
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| AuthError::Profile(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Profile(format!("status {}", response.status())));
        }

        let user = match provider {
            Provider::Google => {
                let profile: GoogleProfile = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Profile(e.to_string()))?;
                User {
                    name: profile.name,
                    email: profile.email,
                    image: profile.picture,
                }
            }
            Provider::Github => {
                let profile: GithubProfile = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Profile(e.to_string()))?;
                User {
                    name: profile.name.or(Some(profile.login)),
                    email: profile.email,
                    image: profile.avatar_url,
                }
            }
        };
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.credentials.contains_key(p))
            .collect()
    }

    fn authorize_url(
        &self,
        provider: Provider,
        redirect_uri: &str,
        state: &str,
    ) -> AuthResult<String> {
        let creds = self.credentials(provider)?;
        build_auth_url(provider, &creds.client_id, redirect_uri, state)
    }

    async fn exchange(
        &self,
        provider: Provider,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<User> {
        debug!(%provider, "Exchanging authorization code");
        let access_token = self.exchange_code(provider, code, redirect_uri).await?;
        let user = self.fetch_profile(provider, &access_token).await?;
        info!(%provider, email = ?user.email, "Signed in");
        Ok(user)
    }
}

/// Accepts any code and signs in a fixed user.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: User,
}

impl StaticIdentity {
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn providers(&self) -> Vec<Provider> {
        Provider::ALL.to_vec()
    }

    fn authorize_url(
        &self,
        provider: Provider,
        redirect_uri: &str,
        state: &str,
    ) -> AuthResult<String> {
        build_auth_url(provider, "static", redirect_uri, state)
    }

    async fn exchange(
        &self,
        _provider: Provider,
        code: &str,
        _redirect_uri: &str,
    ) -> AuthResult<User> {
        if code.is_empty() {
            return Err(AuthError::Exchange("empty code".to_string()));
        }
        Ok(self.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 22);
        assert!(!a.contains('='));
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("GitHub".parse::<Provider>().unwrap(), Provider::Github);
        assert!("gitlab".parse::<Provider>().is_err());
    }

    #[test]
    fn test_build_auth_url() {
        let url = build_auth_url(
            Provider::Github,
            "client 1",
            "http://localhost:3000/auth/callback/github",
            "xyz",
        )
        .unwrap();

        assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
        assert!(url.contains("client_id=client+1"));
        assert!(url.contains("state=xyz"));
        assert!(
            url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback%2Fgithub")
        );
    }

    #[test]
    fn test_oauth_client_lists_configured_providers() {
        let client = OAuthClient::new(HashMap::from([(
            Provider::Google,
            ClientCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
        )]));

        assert_eq!(client.providers(), vec![Provider::Google]);
        assert!(matches!(
            client.authorize_url(Provider::Github, "http://x/cb", "s"),
            Err(AuthError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_static_identity() {
        let identity = StaticIdentity::new(User {
            name: Some("Ada".to_string()),
            email: None,
            image: None,
        });

        let user = identity.exchange(Provider::Google, "code", "cb").await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert!(identity.exchange(Provider::Google, "", "cb").await.is_err());
    }
}
