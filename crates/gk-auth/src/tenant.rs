//! Tenant resolution from email domains.

use gk_model::Tenant;
use gk_storage::Repositories;

use crate::error::{AuthError, AuthResult};

/// Extracts the lowercased domain part of an email address.
///
/// Returns `None` when there is no `@` or the domain is empty.
#[must_use]
pub fn email_domain(email: &str) -> Option<String> {
    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(domain.to_lowercase())
}

/// Resolves tenants from login identifiers.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    repos: Repositories,
}

impl TenantResolver {
    /// Creates a resolver over the given repositories.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Resolves the tenant an email address belongs to.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::TenantNotFound` when the email has no resolvable
    /// domain or no tenant claims it, and `AuthError::TenantInactive` when
    /// the tenant exists but is deactivated.
    pub async fn resolve(&self, email: &str) -> AuthResult<Tenant> {
        let domain = email_domain(email).ok_or(AuthError::TenantNotFound)?;

        let tenant = self
            .repos
            .tenants
            .get_by_domain(&domain)
            .await?
            .ok_or(AuthError::TenantNotFound)?;

        if !tenant.is_active {
            return Err(AuthError::TenantInactive);
        }

        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_active_tenant() {
        let repos = Repositories::in_memory();
        repos
            .tenants
            .create(&Tenant::new("acme.com", "Acme"))
            .await
            .unwrap();

        let resolver = TenantResolver::new(repos);
        let tenant = resolver.resolve("jane@ACME.com").await.unwrap();
        assert_eq!(tenant.domain, "acme.com");
    }

    #[tokio::test]
    async fn unknown_domain_is_not_found() {
        let resolver = TenantResolver::new(Repositories::in_memory());
        assert!(matches!(
            resolver.resolve("jane@nowhere.example").await,
            Err(AuthError::TenantNotFound)
        ));
    }

    #[tokio::test]
    async fn inactive_tenant_is_rejected() {
        let repos = Repositories::in_memory();
        repos
            .tenants
            .create(&Tenant::new("dead.com", "Defunct").with_active(false))
            .await
            .unwrap();

        let resolver = TenantResolver::new(repos);
        assert!(matches!(
            resolver.resolve("bob@dead.com").await,
            Err(AuthError::TenantInactive)
        ));
    }

    #[test]
    fn domain_extraction() {
        assert_eq!(email_domain("a@b.com"), Some("b.com".to_string()));
        assert_eq!(email_domain("a@B.Com"), Some("b.com".to_string()));
        assert_eq!(email_domain("no-at-sign"), None);
        assert_eq!(email_domain("@b.com"), None);
        assert_eq!(email_domain("a@"), None);
    }
}
