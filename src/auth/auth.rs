use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::{Capabilities, Role};
use crate::models::Claims;
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }

    pub fn require_view(&self) -> Result<(), ApiError> {
        if self.capabilities().can_view {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    pub fn require_create(&self) -> Result<(), ApiError> {
        if self.capabilities().can_create {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Review actions and entity administration.
    pub fn require_edit(&self) -> Result<(), ApiError> {
        if self.capabilities().can_edit {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    pub fn require_delete(&self) -> Result<(), ApiError> {
        if self.capabilities().can_delete {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// The employee record behind a self-service action.
    pub fn require_employee_link(&self) -> Result<u64, ApiError> {
        self.employee_id.ok_or(ApiError::Forbidden)
    }

    /// Resolve which employee a read targets. Employees are pinned to their
    /// own records; HR and admins must name one.
    pub fn employee_scope(&self, requested: Option<u64>) -> Result<u64, ApiError> {
        if self.role == Role::Employee {
            let own = self.require_employee_link()?;
            return match requested {
                Some(other) if other != own => Err(ApiError::Forbidden),
                _ => Ok(own),
            };
        }

        requested.ok_or_else(|| ApiError::Validation("employee_id is required".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 7,
            username: "reviewer".into(),
            role,
            employee_id,
        }
    }

    #[test]
    fn employees_cannot_edit_or_delete() {
        let u = user(Role::Employee, Some(1000));
        assert!(u.require_view().is_ok());
        assert!(u.require_create().is_ok());
        assert!(matches!(u.require_edit(), Err(ApiError::Forbidden)));
        assert!(matches!(u.require_delete(), Err(ApiError::Forbidden)));
    }

    #[test]
    fn hr_edits_but_does_not_delete() {
        let u = user(Role::Hr, None);
        assert!(u.require_edit().is_ok());
        assert!(matches!(u.require_delete(), Err(ApiError::Forbidden)));
    }

    #[test]
    fn employee_scope_is_pinned_to_own_record() {
        let u = user(Role::Employee, Some(1000));
        assert_eq!(u.employee_scope(None).unwrap(), 1000);
        assert_eq!(u.employee_scope(Some(1000)).unwrap(), 1000);
        assert!(matches!(u.employee_scope(Some(2000)), Err(ApiError::Forbidden)));
    }

    #[test]
    fn admin_scope_requires_an_explicit_employee() {
        let u = user(Role::Admin, None);
        assert_eq!(u.employee_scope(Some(2000)).unwrap(), 2000);
        assert!(matches!(u.employee_scope(None), Err(ApiError::Validation(_))));
    }
}
