//! Action-bound anti-forgery nonces.
//!
//! A nonce is `hex(blake3_keyed(key, "{action}|{tick}"))` where `tick`
//! advances every half lifetime. Verification accepts the current and the
//! previous tick, so a nonce stays valid for between one half and one full
//! lifetime.

use serde::Serialize;
use subtle::ConstantTimeEq;

/// Key derivation context for nonce keys.
const NONCE_KEY_CONTEXT: &str = "commentctl 2024 action nonce key";

/// Actions a nonce can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceAction {
    DeleteComments,
    CommentsBackup,
    DownloadBackup,
}

impl NonceAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeleteComments => "delete_comments",
            Self::CommentsBackup => "comments_backup",
            Self::DownloadBackup => "download_backup",
        }
    }
}

/// Issues and verifies nonces from one secret.
#[derive(Clone)]
pub struct NonceIssuer {
    key: [u8; 32],
    lifetime_secs: u64,
}

impl std::fmt::Debug for NonceIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceIssuer")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl NonceIssuer {
    /// Creates an issuer. `lifetime_secs` is clamped to at least 2.
    pub fn new(secret: &str, lifetime_secs: u64) -> Self {
        Self {
            key: blake3::derive_key(NONCE_KEY_CONTEXT, secret.as_bytes()),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    fn tick(&self, unix_secs: u64) -> u64 {
        unix_secs / (self.lifetime_secs / 2)
    }

    fn compute(&self, action: NonceAction, tick: u64) -> String {
        let message = format!("{}|{tick}", action.as_str());
        blake3::keyed_hash(&self.key, message.as_bytes())
            .to_hex()
            .to_string()
    }

    /// Nonce for `action` at the current time.
    pub fn issue(&self, action: NonceAction) -> String {
        self.issue_at(action, now_unix())
    }

    pub fn issue_at(&self, action: NonceAction, unix_secs: u64) -> String {
        self.compute(action, self.tick(unix_secs))
    }

    /// Checks a presented nonce against the current time.
    pub fn verify(&self, action: NonceAction, presented: &str) -> bool {
        self.verify_at(action, presented, now_unix())
    }

    pub fn verify_at(&self, action: NonceAction, presented: &str, unix_secs: u64) -> bool {
        let tick = self.tick(unix_secs);
        let current = self.compute(action, tick);
        let previous = self.compute(action, tick.saturating_sub(1));
        let presented = presented.as_bytes();
        let ok_current: bool = current.as_bytes().ct_eq(presented).into();
        let ok_previous: bool = previous.as_bytes().ct_eq(presented).into();
        ok_current | ok_previous
    }
}

fn now_unix() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000;

    #[test]
    fn test_issue_then_verify() {
        let issuer = NonceIssuer::new("secret", 3600);
        let nonce = issuer.issue_at(NonceAction::DeleteComments, T0);
        assert_eq!(nonce.len(), 64);
        assert!(issuer.verify_at(NonceAction::DeleteComments, &nonce, T0));
    }

    #[test]
    fn test_nonce_is_action_bound() {
        let issuer = NonceIssuer::new("secret", 3600);
        let nonce = issuer.issue_at(NonceAction::CommentsBackup, T0);
        assert!(!issuer.verify_at(NonceAction::DeleteComments, &nonce, T0));
        assert!(!issuer.verify_at(NonceAction::DownloadBackup, &nonce, T0));
    }

    #[test]
    fn test_nonce_is_secret_bound() {
        let a = NonceIssuer::new("secret-a", 3600);
        let b = NonceIssuer::new("secret-b", 3600);
        let nonce = a.issue_at(NonceAction::DownloadBackup, T0);
        assert!(!b.verify_at(NonceAction::DownloadBackup, &nonce, T0));
    }

    #[test]
    fn test_nonce_expires_after_two_ticks() {
        let issuer = NonceIssuer::new("secret", 3600);
        let nonce = issuer.issue_at(NonceAction::DeleteComments, T0);
        // Still valid half a lifetime later (previous tick accepted).
        assert!(issuer.verify_at(NonceAction::DeleteComments, &nonce, T0 + 1800));
        // Gone after a full lifetime.
        assert!(!issuer.verify_at(NonceAction::DeleteComments, &nonce, T0 + 3600));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = NonceIssuer::new("secret", 3600);
        assert!(!issuer.verify_at(NonceAction::DeleteComments, "", T0));
        assert!(!issuer.verify_at(NonceAction::DeleteComments, "deadbeef", T0));
    }

    #[test]
    fn test_live_issue_verifies() {
        let issuer = NonceIssuer::new("secret", 86_400);
        let nonce = issuer.issue(NonceAction::CommentsBackup);
        assert!(issuer.verify(NonceAction::CommentsBackup, &nonce));
    }
}
