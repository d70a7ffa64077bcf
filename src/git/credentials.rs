use git2::{Cred, CredentialType, RemoteCallbacks};
use std::fmt;

/// HTTPS credentials for clone and push: the account login and its token.
///
/// The token is handed to git only through the credential callback, so it
/// never ends up in a remote URL or in `.git/config`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Remote callbacks answering credential requests with `credentials`.
pub fn remote_callbacks(credentials: &Credentials) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0u8;
    callbacks.credentials(move |_url, _username_from_url, allowed| {
        // libgit2 keeps asking as long as we keep answering; give up after
        // the first rejection so a bad token fails instead of looping.
        attempts += 1;
        if attempts > 1 {
            return Err(git2::Error::from_str("authentication failed for the supplied token"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::userpass_plaintext(&credentials.username, &credentials.token)
        } else {
            Cred::default()
        }
    });
    callbacks
}
