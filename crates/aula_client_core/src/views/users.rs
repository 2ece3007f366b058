use super::{require_non_empty, ViewContext};
use crate::error::{ClientError, Result};
use crate::ids::UserId;
use crate::models::{Role, User, UserForm};
use crate::scope::RequestScope;
use tracing::info;

/// User administration (admin only).
pub struct UsersView {
    ctx: ViewContext,
    scope: RequestScope,
    pub users: Vec<User>,
}

impl UsersView {
    pub fn new(ctx: ViewContext) -> Self {
        let scope = ctx.scope();
        Self {
            ctx,
            scope,
            users: Vec::new(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.ctx.session.require_role(Role::Administrator)?;
        self.users = self.scope.run(self.ctx.gateway.users()).await?;
        Ok(())
    }

    pub fn students(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.is_student()).collect()
    }

    /// A new user needs every field including a password.
    pub async fn create(&mut self, form: UserForm) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        validate_form(&form, true)?;
        let message = self.scope.run(self.ctx.gateway.create_user(&form)).await?;
        info!(username = %form.username, "user created");
        self.load().await?;
        Ok(message)
    }

    /// Update an existing user; an absent password leaves it unchanged.
    pub async fn update(&mut self, id: UserId, form: UserForm) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        validate_form(&form, false)?;
        let message = self
            .scope
            .run(self.ctx.gateway.update_user(id, &form))
            .await?;
        info!(user_id = %id, "user updated");
        self.load().await?;
        Ok(message)
    }

    pub async fn delete(&mut self, id: UserId) -> Result<String> {
        self.ctx.session.require_role(Role::Administrator)?;
        let message = self.scope.run(self.ctx.gateway.delete_user(id)).await?;
        info!(user_id = %id, "user deleted");
        self.load().await?;
        Ok(message)
    }
}

fn validate_form(form: &UserForm, password_required: bool) -> Result<()> {
    require_non_empty(&form.username, "El usuario es obligatorio")?;
    require_non_empty(&form.email, "El email es obligatorio")?;
    require_non_empty(&form.first_name, "El nombre es obligatorio")?;
    require_non_empty(&form.last_name, "El apellido es obligatorio")?;
    if form.dni <= 0 {
        return Err(ClientError::Validation("El DNI es obligatorio".to_string()));
    }
    if password_required && form.password.as_deref().map_or(true, |p| p.trim().is_empty()) {
        return Err(ClientError::Validation(
            "La contraseña es obligatoria".to_string(),
        ));
    }
    Ok(())
}
