use super::tenant::{AuthError, TenantId};

/// Session-scoped tenant identity carried by a connection or transaction.
///
/// The context is an explicit value: every scoped storage call reads the tenant from the
/// context it was handed, never from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    tenant: Option<TenantId>,
}

impl TenantContext {
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn for_tenant(tenant: TenantId) -> Self {
        Self {
            tenant: Some(tenant),
        }
    }

    pub fn set_current_tenant(&mut self, tenant: TenantId) {
        self.tenant = Some(tenant);
    }

    /// Parse and install a tenant in one step; a malformed value leaves the context unset.
    pub fn set_current_tenant_str(&mut self, raw: &str) -> Result<TenantId, AuthError> {
        match TenantId::parse(raw) {
            Ok(tenant) => {
                self.tenant = Some(tenant);
                Ok(tenant)
            }
            Err(err) => {
                self.tenant = None;
                Err(err)
            }
        }
    }

    pub fn current_tenant(&self) -> Result<TenantId, AuthError> {
        self.tenant.ok_or(AuthError::AuthenticationRequired)
    }

    pub fn is_set(&self) -> bool {
        self.tenant.is_some()
    }

    pub fn clear(&mut self) {
        self.tenant = None;
    }
}
