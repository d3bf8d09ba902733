//! Admin capability check.

use subtle::ConstantTimeEq;

/// Bearer token gating every admin route.
///
/// With no token configured every request is rejected.
#[derive(Clone, Default)]
pub struct AdminToken {
    expected: Option<String>,
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminToken")
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

impl AdminToken {
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Constant-time comparison against the configured token.
    pub fn verify(&self, presented: &str) -> bool {
        match &self.expected {
            Some(expected) => expected.as_bytes().ct_eq(presented.as_bytes()).into(),
            None => false,
        }
    }
}
