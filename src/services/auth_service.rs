use validator::Validate;

use crate::config::AdminSeed;
use crate::database::store::{ApplicantStore, DynStore, UserStore};
use crate::dto::auth_dto::{LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::models::user::{NewUser, PublicUser, Role};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::token::{Claims, TokenKeys};

pub const UNKNOWN_EMAIL: &str = "Email tidak ditemukan";
pub const WRONG_PASSWORD: &str = "Password salah";

#[derive(Clone)]
pub struct AuthService {
    store: DynStore,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(store: DynStore, keys: TokenKeys) -> Self {
        Self { store, keys }
    }

    /// Anonymous callers always get a USER account.
    pub async fn register(&self, req: RegisterRequest, caller: Option<&Claims>) -> Result<PublicUser> {
        req.validate()?;

        let role = req.role.unwrap_or_default();
        if role == Role::Admin && !caller.map_or(false, Claims::is_admin) {
            return Err(Error::Forbidden(
                "Hanya admin yang dapat membuat akun admin".to_string(),
            ));
        }

        let user = self
            .store
            .insert_user(NewUser {
                name: req.name.trim().to_string(),
                email: req.email.trim().to_string(),
                password_hash: hash_password(&req.password)?,
                role,
            })
            .await?;
        tracing::info!(user_id = user.id, role = role.as_str(), "user registered");
        Ok(user.into())
    }

    pub async fn login(&self, req: LoginRequest) -> Result<(PublicUser, String)> {
        req.validate()?;

        let user = self
            .store
            .find_user_by_email(req.email.trim())
            .await?
            .ok_or_else(|| Error::Unauthorized(UNKNOWN_EMAIL.to_string()))?;

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "login rejected");
            return Err(Error::Unauthorized(WRONG_PASSWORD.to_string()));
        }

        let token = self.keys.issue(&user)?;
        Ok((user.into(), token))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.keys.verify(token)
    }

    /// The caller's account and the id of the application linked to it, if any.
    pub async fn me(&self, claims: &Claims) -> Result<(PublicUser, Option<i32>)> {
        let user = self
            .store
            .find_user(claims.user_id()?)
            .await?
            .ok_or_else(|| Error::Unauthorized("Akun tidak ditemukan".to_string()))?;
        let applicant_id = self
            .store
            .find_applicant_by_user(user.id)
            .await?
            .map(|applicant| applicant.id);
        Ok((user.into(), applicant_id))
    }

    /// Creates the bootstrap admin unless an account with that email exists.
    /// Returns whether a new account was created.
    pub async fn ensure_admin(&self, seed: &AdminSeed) -> Result<bool> {
        if self.store.find_user_by_email(&seed.email).await?.is_some() {
            return Ok(false);
        }
        let user = self
            .store
            .insert_user(NewUser {
                name: seed.name.clone(),
                email: seed.email.clone(),
                password_hash: hash_password(&seed.password)?,
                role: Role::Admin,
            })
            .await?;
        tracing::info!(user_id = user.id, email = %user.email, "admin account created");
        Ok(true)
    }
}
