use coursedesk_auth::{PrincipalId, Role};

/// Principal context for a request (authenticated identity + roles).
///
/// Inserted into request extensions by the auth middleware; must be present
/// for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self {
            principal_id,
            roles,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

/// Request context carried through the pipeline for logging and the failure
/// envelope's `path` field.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub principal: Option<PrincipalId>,
}

impl RequestContext {
    pub fn new(method: impl Into<String>, path: impl Into<String>, principal: Option<PrincipalId>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            principal,
        }
    }
}
