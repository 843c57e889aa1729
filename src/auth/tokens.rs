//! In-memory token pair

/// Access/refresh bearer token pair held by the bridge
///
/// Lives only in process memory. Persistence across restarts, if any, is
/// an external collaborator's concern.
#[derive(Debug, Clone, Default)]
pub struct TokenPair {
    /// Short-lived bearer credential
    pub access: Option<String>,
    /// Longer-lived renewal credential
    pub refresh: Option<String>,
}

impl TokenPair {
    /// Drop both tokens
    pub fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
    }
}
