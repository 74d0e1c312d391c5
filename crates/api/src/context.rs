use std::sync::Arc;

use caseworks_auth::{Principal, Role};

/// Principal context for a request: read-only access to the authenticated
/// identity established by the authentication stage.
///
/// Present in request extensions only when authentication succeeded; its
/// absence is what the authorization gate treats as "unauthenticated".
#[derive(Debug, Clone)]
pub struct PrincipalContext(Arc<Principal>);

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self(Arc::new(principal))
    }

    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn subject(&self) -> &str {
        self.0.subject()
    }

    pub fn roles(&self) -> &[Role] {
        self.0.roles()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.0.has_role(role)
    }
}
