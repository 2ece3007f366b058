use super::{landing_screen, require_non_empty, Screen, ViewContext};
use crate::error::Result;
use crate::models::{SessionUser, SignedUpUser};
use crate::scope::RequestScope;
use tracing::info;

pub struct LoginView {
    ctx: ViewContext,
    scope: RequestScope,
}

impl LoginView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self { ctx, scope }
    }

    /// Log in and store the token and user in the session. Returns the landing screen.
    pub async fn submit(&self, username: &str, password: &str) -> Result<(SessionUser, Screen)> {
        let username = require_non_empty(username, "Ingresa tu usuario")?;
        require_non_empty(password, "Ingresa tu contraseña")?;

        let outcome = self
            .scope
            .run(self.ctx.gateway.login(&username, password))
            .await?;
        self.ctx.session.sign_in(outcome.token, outcome.user.clone())?;
        let screen = landing_screen(Some(&outcome.user.role));
        Ok((outcome.user, screen))
    }

    pub fn logout(&self) -> Result<()> {
        self.ctx.session.sign_out()
    }
}

pub struct SignupView {
    ctx: ViewContext,
    scope: RequestScope,
}

impl SignupView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self { ctx, scope }
    }

    pub async fn submit(&self, username: &str, password: &str) -> Result<SignedUpUser> {
        let username = require_non_empty(username, "Ingresa un usuario")?;
        require_non_empty(password, "Ingresa una contraseña")?;
        let user = self
            .scope
            .run(self.ctx.gateway.signup(&username, password))
            .await?;
        info!(user_id = %user.id, "account created");
        Ok(user)
    }
}
