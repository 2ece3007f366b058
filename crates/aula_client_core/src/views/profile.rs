use super::{require_non_empty, ViewContext};
use crate::error::{ClientError, Result};
use crate::models::Profile;
use crate::scope::RequestScope;
use tracing::info;

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct ProfileView {
    ctx: ViewContext,
    scope: RequestScope,
    pub profile: Option<Profile>,
}

impl ProfileView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            profile: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        let user = self.ctx.session.require_user()?;
        let profile = self
            .scope
            .run(self.ctx.gateway.profile(user.user_id))
            .await?;
        self.profile = Some(profile);
        Ok(())
    }

    /// Change the password after checking the form locally; nothing is sent if it is invalid.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<String> {
        self.ctx.session.require_user()?;
        validate_password_change(current, new, confirm)?;
        let message = self
            .scope
            .run(self.ctx.gateway.change_password(current, new))
            .await?;
        info!("password changed");
        Ok(message)
    }
}

pub(crate) fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<()> {
    require_non_empty(current, "Ingresa tu contraseña actual")?;
    if new != confirm {
        return Err(ClientError::Validation(
            "Las contraseñas nuevas no coinciden".to_string(),
        ));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "La nueva contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
