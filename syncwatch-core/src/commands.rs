use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use syncwatch_model::ControllerCommand;

use crate::error::CommandError;

/// Fire-and-forget channel to the controller.
///
/// Implementations attach the admin credential and report rejection; they
/// never retry, and callers never roll back local state on failure. The next
/// feed event is the only source of truth.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn issue(
        &self,
        command: &ControllerCommand,
    ) -> Result<(), CommandError>;
}

#[async_trait]
impl<T: CommandChannel + ?Sized> CommandChannel for Arc<T> {
    async fn issue(
        &self,
        command: &ControllerCommand,
    ) -> Result<(), CommandError> {
        (**self).issue(command).await
    }
}

/// Admin credential as last entered locally. Read at send time.
///
/// The controller compares this value against its admin password in a
/// plain `Authorization` header; anyone who can observe the traffic can
/// replay it.
#[derive(Clone, Default)]
pub struct CredentialStore {
    secret: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            secret: Arc::new(RwLock::new(initial.filter(|s| !s.is_empty()))),
        }
    }

    /// An empty secret clears the store.
    pub fn set(&self, secret: impl Into<String>) {
        let secret = secret.into();
        *self.secret.write() = (!secret.is_empty()).then_some(secret);
    }

    pub fn current(&self) -> Option<String> {
        self.secret.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.secret.read().is_some()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("is_set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_counts_as_unset() {
        let store = CredentialStore::new(Some(String::new()));
        assert!(!store.is_set());

        store.set("hunter2");
        assert_eq!(store.current().as_deref(), Some("hunter2"));

        store.set("");
        assert!(store.current().is_none());
    }

    #[test]
    fn clones_share_the_secret() {
        let store = CredentialStore::default();
        let reader = store.clone();
        store.set("pw");
        assert!(reader.is_set());
        store.set("");
        assert!(!reader.is_set());
    }

    #[test]
    fn debug_output_redacts_secret() {
        let store = CredentialStore::new(Some("s3cret".into()));
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("s3cret"));
    }
}
