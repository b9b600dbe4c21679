//! Credential verification. Mutating routes hand a [`Credential`] to an
//! [`Authenticator`] and get back the [`Identity`] it proves, or an error.
//! There is no session: every call carries its own credential.

pub mod password;
pub mod token;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::CredentialMode;
use crate::database::{DatabaseError, UserDirectory};

pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenIssuer};

/// What a caller presents to prove who they are
#[derive(Clone)]
pub enum Credential {
    Password { username: String, password: String },
    Token(String),
}

impl Credential {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Password { .. } => "password",
            Credential::Token(_) => "token",
        }
    }
}

// Never print secrets
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
            Credential::Token(_) => f.write_str("Token(..)"),
        }
    }
}

/// An authenticated username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} credentials are disabled")]
    UnsupportedCredential(&'static str),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl AuthError {
    /// True when the caller presented something wrong, as opposed to the
    /// server failing to check it.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::UnsupportedCredential(_) | AuthError::InvalidCredentials | AuthError::InvalidToken(_)
        )
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check a credential of any form the deployment accepts
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, AuthError>;

    /// Username/password check for token exchange, regardless of which forms
    /// mutating routes accept
    async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Checks passwords against the user directory and tokens against the issuer,
/// accepting only the forms enabled by `mode`. Without an issuer no token is
/// ever accepted.
pub struct CredentialAuthenticator {
    users: Arc<dyn UserDirectory>,
    tokens: Option<TokenIssuer>,
    mode: CredentialMode,
}

impl CredentialAuthenticator {
    pub fn new(users: Arc<dyn UserDirectory>, tokens: Option<TokenIssuer>, mode: CredentialMode) -> Self {
        Self { users, tokens, mode }
    }

    async fn check_password(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let user = self
            .users
            .find_user(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Identity { username: user.username })
    }

    async fn check_token(&self, tokens: &TokenIssuer, token: &str) -> Result<Identity, AuthError> {
        let claims = tokens.verify(token)?;
        // A token outliving its user proves nothing
        if !self.users.user_exists(&claims.sub).await? {
            return Err(AuthError::InvalidToken("subject no longer exists".to_string()));
        }
        Ok(Identity { username: claims.sub })
    }
}

#[async_trait]
impl Authenticator for CredentialAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Result<Identity, AuthError> {
        match credential {
            Credential::Password { username, password } => {
                if !self.mode.allows_password() {
                    return Err(AuthError::UnsupportedCredential("password"));
                }
                self.check_password(username, password).await
            }
            Credential::Token(token) => {
                let Some(tokens) = self.tokens.as_ref().filter(|_| self.mode.allows_token()) else {
                    return Err(AuthError::UnsupportedCredential("token"));
                };
                self.check_token(tokens, token).await
            }
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_password(username, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryUserDirectory;

    async fn authenticator(mode: CredentialMode) -> (CredentialAuthenticator, TokenIssuer) {
        let users = Arc::new(InMemoryUserDirectory::new());
        users.insert("user1", &hash_password("password_1234").unwrap()).await;
        let tokens = TokenIssuer::new("test-secret", "plots-api", 1).unwrap();
        (CredentialAuthenticator::new(users, Some(tokens.clone()), mode), tokens)
    }

    #[tokio::test]
    async fn password_form() {
        let (auth, _) = authenticator(CredentialMode::Both).await;

        let identity = auth
            .authenticate(&Credential::password("user1", "password_1234"))
            .await
            .unwrap();
        assert_eq!(identity.username, "user1");

        let wrong = auth.authenticate(&Credential::password("user1", "password")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = auth.authenticate(&Credential::password("nobody", "password_1234")).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn token_form() {
        let (auth, tokens) = authenticator(CredentialMode::Both).await;

        let token = tokens.issue("user1").unwrap().token;
        let identity = auth.authenticate(&Credential::Token(token)).await.unwrap();
        assert_eq!(identity.username, "user1");

        let orphan = tokens.issue("deleted-user").unwrap().token;
        assert!(matches!(
            auth.authenticate(&Credential::Token(orphan)).await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn disabled_forms_are_rejected() {
        let (password_only, tokens) = authenticator(CredentialMode::Password).await;
        let token = tokens.issue("user1").unwrap().token;
        let err = password_only.authenticate(&Credential::Token(token)).await.unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedCredential("token")));
        assert!(err.is_rejection());

        let (token_only, _) = authenticator(CredentialMode::Token).await;
        let err = token_only
            .authenticate(&Credential::password("user1", "password_1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedCredential("password")));

        // Token exchange still checks the password in token-only deployments
        let identity = token_only.login("user1", "password_1234").await.unwrap();
        assert_eq!(identity.username, "user1");
    }

    #[tokio::test]
    async fn no_issuer_means_no_tokens() {
        let users = Arc::new(InMemoryUserDirectory::new());
        let tokens = TokenIssuer::new("test-secret", "plots-api", 1).unwrap();
        let auth = CredentialAuthenticator::new(users, None, CredentialMode::Both);
        let token = tokens.issue("user1").unwrap().token;
        assert!(matches!(
            auth.authenticate(&Credential::Token(token)).await,
            Err(AuthError::UnsupportedCredential("token"))
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let printed = format!("{:?}", Credential::password("user1", "hunter2"));
        assert!(printed.contains("user1"));
        assert!(!printed.contains("hunter2"));
        assert_eq!(format!("{:?}", Credential::Token("abc.def".into())), "Token(..)");
    }
}
