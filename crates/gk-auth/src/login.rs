//! Multi-step login flow.
//!
//! Every step that cannot finish the login mints a server-side
//! [`PendingLogin`] and hands the client only its opaque flow token. The
//! stage recorded on the pending row is the sole authority on what the
//! token may be used for.

use gk_crypto::{generate_flow_token, CryptoError, PasswordHasherService};
use gk_model::{LoginStage, PendingLogin, User};
use gk_storage::Repositories;
use tracing::info;

use crate::error::{AuthError, AuthResult};
use crate::mfa::{MfaEngine, MfaSetup};
use crate::policy::validate_password;
use crate::tenant::TenantResolver;

/// Outcome of a login step.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Login finished; the caller establishes the session.
    Authenticated(Box<User>),
    /// More steps are needed; the client presents the flow token next.
    Pending {
        /// Opaque correlation token.
        flow_token: String,
        /// What the next step is.
        stage: LoginStage,
    },
}

/// Drives the password / password-change / MFA login sequence.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    repos: Repositories,
    tenants: TenantResolver,
    mfa: MfaEngine,
    hasher: PasswordHasherService,
}

impl LoginFlow {
    /// Creates a login flow over the given repositories.
    #[must_use]
    pub fn new(repos: Repositories, mfa: MfaEngine) -> Self {
        Self {
            tenants: TenantResolver::new(repos.clone()),
            repos,
            mfa,
            hasher: PasswordHasherService,
        }
    }

    /// Returns the MFA engine backing this flow.
    #[must_use]
    pub const fn mfa(&self) -> &MfaEngine {
        &self.mfa
    }

    async fn suspend(&self, user: &User, stage: LoginStage) -> AuthResult<LoginOutcome> {
        let flow_token = generate_flow_token();
        let pending = PendingLogin::new(flow_token.clone(), user.id, user.tenant_id, stage);
        self.repos.pending_logins.create(&pending).await?;
        Ok(LoginOutcome::Pending { flow_token, stage })
    }

    /// Decides what comes after a verified password (or password change).
    async fn after_password(
        &self,
        user: User,
        user_agent: &str,
        ip: &str,
    ) -> AuthResult<LoginOutcome> {
        if user.require_password_change {
            return self.suspend(&user, LoginStage::PasswordChange).await;
        }
        if user.require_mfa_setup && !user.mfa_enabled {
            return self.suspend(&user, LoginStage::MfaSetup).await;
        }
        if user.mfa_enabled && !self.mfa.is_trusted(user.id, user_agent, ip).await? {
            return self.suspend(&user, LoginStage::Mfa).await;
        }

        info!(user_id = %user.id, "login complete");
        Ok(LoginOutcome::Authenticated(Box::new(user)))
    }

    /// Starts a login with email and password.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::TenantNotFound` / `AuthError::TenantInactive`
    /// for domain problems, `AuthError::InvalidCredentials` for an unknown
    /// user or wrong password, and `AuthError::AccountInactive` for a
    /// deactivated account.
    pub async fn start(
        &self,
        email: &str,
        password: &str,
        user_agent: &str,
        ip: &str,
    ) -> AuthResult<LoginOutcome> {
        let tenant = self.tenants.resolve(email).await?;

        let user = self
            .repos
            .users
            .get_by_email(tenant.id, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.hasher
            .verify(password, &user.password_hash)
            .map_err(|e| match e {
                CryptoError::VerificationFailed => AuthError::InvalidCredentials,
                other => AuthError::Internal(other.to_string()),
            })?;

        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.after_password(user, user_agent, ip).await
    }

    /// Loads and validates the pending record behind a flow token.
    async fn pending(&self, flow_token: &str, expected: LoginStage) -> AuthResult<(PendingLogin, User)> {
        let pending = self
            .repos
            .pending_logins
            .get(flow_token)
            .await?
            .ok_or(AuthError::FlowExpired)?;
        if pending.is_expired() || pending.stage != expected {
            return Err(AuthError::FlowExpired);
        }

        let user = self
            .repos
            .users
            .get_by_id(pending.tenant_id, pending.user_id)
            .await?
            .ok_or(AuthError::FlowExpired)?;

        Ok((pending, user))
    }

    /// Completes a forced password change and continues the login. The
    /// current password is re-verified; holding a flow token alone is not
    /// enough to rotate the credential.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::FlowExpired` for a bad token,
    /// `AuthError::InvalidCredentials` for a wrong current password, and
    /// `AuthError::PasswordPolicyViolation` when the new password fails the
    /// rules or matches the old one.
    pub async fn change_password(
        &self,
        flow_token: &str,
        current_password: &str,
        new_password: &str,
        user_agent: &str,
        ip: &str,
    ) -> AuthResult<LoginOutcome> {
        let (pending, mut user) = self.pending(flow_token, LoginStage::PasswordChange).await?;

        self.hasher
            .verify(current_password, &user.password_hash)
            .map_err(|e| match e {
                CryptoError::VerificationFailed => AuthError::InvalidCredentials,
                other => AuthError::Internal(other.to_string()),
            })?;

        validate_password(new_password)?;
        if new_password == current_password {
            return Err(AuthError::PasswordPolicyViolation(
                "must differ from the current password".to_string(),
            ));
        }

        user.password_hash = self
            .hasher
            .hash(new_password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        user.require_password_change = false;
        user.touch();
        self.repos.users.update(&user).await?;
        self.repos.pending_logins.delete(&pending.flow_token).await?;

        info!(user_id = %user.id, "forced password change complete");
        self.after_password(user, user_agent, ip).await
    }

    /// Starts MFA enrollment for a login suspended at the setup stage.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::FlowExpired` for a bad token plus any enrollment
    /// error from the MFA engine.
    pub async fn begin_mfa_setup(&self, flow_token: &str) -> AuthResult<MfaSetup> {
        let (_, mut user) = self.pending(flow_token, LoginStage::MfaSetup).await?;
        self.mfa.begin_setup(&mut user).await
    }

    /// Confirms MFA enrollment and finishes the login.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::FlowExpired` for a bad token and
    /// `AuthError::InvalidCode` for a wrong confirmation code.
    pub async fn complete_mfa_setup(&self, flow_token: &str, code: &str) -> AuthResult<Box<User>> {
        let (pending, mut user) = self.pending(flow_token, LoginStage::MfaSetup).await?;

        self.mfa.complete_setup(&mut user, code).await?;
        self.repos.pending_logins.delete(&pending.flow_token).await?;

        Ok(Box::new(user))
    }

    /// Answers the MFA challenge and finishes the login. A wrong code
    /// leaves the pending record in place so the user can retry within the
    /// flow lifetime.
    ///
    /// ## Errors
    ///
    /// Returns `AuthError::FlowExpired` for a bad token and
    /// `AuthError::InvalidCode` for a wrong code.
    pub async fn verify_mfa(
        &self,
        flow_token: &str,
        code: &str,
        user_agent: &str,
        ip: &str,
        trust_device: bool,
    ) -> AuthResult<Box<User>> {
        let (pending, mut user) = self.pending(flow_token, LoginStage::Mfa).await?;

        self.mfa.verify_code(&mut user, code).await?;
        if trust_device {
            self.mfa.trust_device(user.id, user_agent, ip).await?;
        }
        self.repos.pending_logins.delete(&pending.flow_token).await?;

        info!(user_id = %user.id, "MFA challenge passed");
        Ok(Box::new(user))
    }
}

#[cfg(test)]
mod tests {
    use gk_model::Tenant;

    use super::*;

    const PASSWORD: &str = "Corr3ct!horse";

    struct Fixture {
        flow: LoginFlow,
        repos: Repositories,
    }

    async fn fixture() -> Fixture {
        let repos = Repositories::in_memory();
        let mfa = MfaEngine::new(repos.clone(), "Gatekey");
        Fixture {
            flow: LoginFlow::new(repos.clone(), mfa),
            repos,
        }
    }

    async fn seed_user(fx: &Fixture, configure: impl FnOnce(User) -> User) -> User {
        let tenant = Tenant::new("acme.com", "Acme");
        fx.repos.tenants.create(&tenant).await.unwrap();

        let hash = PasswordHasherService.hash(PASSWORD).unwrap();
        let user = configure(User::new(tenant.id, "jane@acme.com", "Jane", hash));
        fx.repos.users.create(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn plain_login_authenticates() {
        let fx = fixture().await;
        seed_user(&fx, |u| u).await;

        let outcome = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
    }

    #[tokio::test]
    async fn unknown_user_and_bad_password_are_indistinguishable() {
        let fx = fixture().await;
        seed_user(&fx, |u| u).await;

        let unknown = fx
            .flow
            .start("ghost@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap_err();
        let wrong = fx
            .flow
            .start("jane@acme.com", "Wr0ng!pass", "UA", "10.0.0.1")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn inactive_account_is_rejected() {
        let fx = fixture().await;
        seed_user(&fx, |u| u.with_active(false)).await;

        assert!(matches!(
            fx.flow
                .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
                .await,
            Err(AuthError::AccountInactive)
        ));
    }

    #[tokio::test]
    async fn forced_password_change_then_login() {
        let fx = fixture().await;
        seed_user(&fx, User::with_password_change_required).await;

        let LoginOutcome::Pending { flow_token, stage } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };
        assert_eq!(stage, LoginStage::PasswordChange);

        let outcome = fx
            .flow
            .change_password(&flow_token, PASSWORD, "N3w!Passw0rd", "UA", "10.0.0.1")
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));

        // The flow token is finished
        assert!(matches!(
            fx.flow
                .change_password(&flow_token, PASSWORD, "An0ther!Pass", "UA", "10.0.0.1")
                .await,
            Err(AuthError::FlowExpired)
        ));
    }

    #[tokio::test]
    async fn password_change_rejects_same_password() {
        let fx = fixture().await;
        seed_user(&fx, User::with_password_change_required).await;

        let LoginOutcome::Pending { flow_token, .. } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };

        assert!(matches!(
            fx.flow
                .change_password(&flow_token, PASSWORD, PASSWORD, "UA", "10.0.0.1")
                .await,
            Err(AuthError::PasswordPolicyViolation(_))
        ));
    }

    #[tokio::test]
    async fn password_change_reverifies_current_password() {
        let fx = fixture().await;
        seed_user(&fx, User::with_password_change_required).await;

        let LoginOutcome::Pending { flow_token, .. } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };

        // A stolen flow token without the current password gets nowhere
        assert!(matches!(
            fx.flow
                .change_password(&flow_token, "Wr0ng!pass", "N3w!Passw0rd", "UA", "10.0.0.1")
                .await,
            Err(AuthError::InvalidCredentials)
        ));

        // The flow stays usable with the right current password
        let outcome = fx
            .flow
            .change_password(&flow_token, PASSWORD, "N3w!Passw0rd", "UA", "10.0.0.1")
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
    }

    #[tokio::test]
    async fn mfa_challenge_round_trip() {
        let fx = fixture().await;
        let mut user = seed_user(&fx, User::with_mfa_setup_required).await;

        // Enroll through the login flow
        let LoginOutcome::Pending { flow_token, stage } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };
        assert_eq!(stage, LoginStage::MfaSetup);

        let setup = fx.flow.begin_mfa_setup(&flow_token).await.unwrap();
        let code = fx
            .flow
            .mfa()
            .totp(&setup.secret, "jane@acme.com")
            .unwrap()
            .generate_current()
            .unwrap();
        fx.flow.complete_mfa_setup(&flow_token, &code).await.unwrap();

        // Next login from an untrusted device lands on the challenge
        let LoginOutcome::Pending { flow_token, stage } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };
        assert_eq!(stage, LoginStage::Mfa);

        user = fx.repos.users.get_by_id(user.tenant_id, user.id).await.unwrap().unwrap();
        let code = fx
            .flow
            .mfa()
            .totp(user.mfa_secret.as_deref().unwrap(), "jane@acme.com")
            .unwrap()
            .generate_current()
            .unwrap();
        let user = fx
            .flow
            .verify_mfa(&flow_token, &code, "UA", "10.0.0.1", true)
            .await
            .unwrap();
        assert!(user.mfa_enabled);

        // The trusted device now skips the challenge
        let outcome = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
    }

    #[tokio::test]
    async fn wrong_mfa_code_keeps_flow_alive() {
        let fx = fixture().await;
        let user = seed_user(&fx, |u| u).await;

        // Enable MFA directly
        let mut user = fx.repos.users.get_by_id(user.tenant_id, user.id).await.unwrap().unwrap();
        let setup = fx.flow.mfa().begin_setup(&mut user).await.unwrap();
        let code = fx
            .flow
            .mfa()
            .totp(&setup.secret, "jane@acme.com")
            .unwrap()
            .generate_current()
            .unwrap();
        fx.flow.mfa().complete_setup(&mut user, &code).await.unwrap();

        let LoginOutcome::Pending { flow_token, .. } = fx
            .flow
            .start("jane@acme.com", PASSWORD, "UA", "10.0.0.1")
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };

        assert!(matches!(
            fx.flow
                .verify_mfa(&flow_token, "000000", "UA", "10.0.0.1", false)
                .await,
            Err(AuthError::InvalidCode)
        ));

        // Retry with a valid code still works
        let user = fx.repos.users.get_by_id(user.tenant_id, user.id).await.unwrap().unwrap();
        let code = fx
            .flow
            .mfa()
            .totp(user.mfa_secret.as_deref().unwrap(), "jane@acme.com")
            .unwrap()
            .generate_current()
            .unwrap();
        fx.flow
            .verify_mfa(&flow_token, &code, "UA", "10.0.0.1", false)
            .await
            .unwrap();
    }
}
