//! Authentication service for login, token management, and user accounts

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{User, UserRole};
use shared::validation::{validate_email, validate_password, validate_username};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Input for creating a user account
#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub role: String,
    pub full_name: String,
    pub email: String,
}

/// Input for updating a user account; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub password: Option<String>,
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// User row with password hash, for credential checks
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    full_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    role: String,
    full_name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role = UserRole::from_str(&self.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in database: {}", self.role)))?;
        Ok(User {
            id: self.id,
            username: self.username,
            role,
            full_name: self.full_name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate with username and password, returning the user and tokens
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(User, AuthTokens)> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r#"
            SELECT id, username, password_hash, role, full_name, email, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let role = UserRole::from_str(&row.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role in database: {}", row.role)))?;

        let user = User {
            id: row.id,
            username: row.username,
            role,
            full_name: row.full_name,
            email: row.email,
            created_at: row.created_at,
        };

        let tokens = self.generate_tokens(&user)?;

        tracing::info!(username = %user.username, "user logged in");

        Ok((user, tokens))
    }

    /// Exchange a valid refresh token for a fresh token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = self.validate_token(refresh_token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let user = self.get_user(user_id).await?;

        self.generate_tokens(&user)
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }

    /// Generate access and refresh tokens for a user
    pub fn generate_tokens(&self, user: &User) -> AppResult<AuthTokens> {
        let now = Utc::now().timestamp();
        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());

        let access_claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            exp: now + self.access_token_expiry,
            iat: now,
        };
        let refresh_claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            exp: now + self.refresh_token_expiry,
            iat: now,
        };

        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Get a single user by ID
    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, role, full_name, email, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::UserNotFound)?
        .into_user()
    }

    /// List all user accounts
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, role, full_name, email, created_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Create a user account
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        validate_username(&input.username)?;
        validate_password(&input.password)?;
        validate_email(&input.email)?;

        let role = Self::parse_role(&input.role)?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, role, full_name, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, role, full_name, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.username)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(&input.full_name)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry("username".to_string())
            }
            _ => AppError::DatabaseError(e),
        })?;

        tracing::info!(username = %row.username, "user account created");

        row.into_user()
    }

    /// Update a user account; only provided fields change
    pub async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        let current = self.get_user(id).await?;

        let role = match &input.role {
            Some(r) => Self::parse_role(r)?,
            None => current.role,
        };

        let password_hash = match &input.password {
            Some(p) => {
                validate_password(p)?;
                Some(
                    hash(p, DEFAULT_COST).map_err(|e| {
                        AppError::Internal(format!("Password hashing failed: {}", e))
                    })?,
                )
            }
            None => None,
        };

        if let Some(email) = &input.email {
            validate_email(email)?;
        }

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET password_hash = COALESCE($2, password_hash),
                role = $3,
                full_name = COALESCE($4, full_name),
                email = COALESCE($5, email)
            WHERE id = $1
            RETURNING id, username, role, full_name, email, created_at
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(&input.full_name)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        row.into_user()
    }

    /// Delete a user account
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }

        Ok(())
    }

    fn parse_role(role: &str) -> AppResult<UserRole> {
        UserRole::from_str(role).ok_or_else(|| AppError::Validation {
            field: "role".to_string(),
            message: "Role must be one of: staff, manager, admin".to_string(),
            message_fr: "Le rôle doit être : staff, manager ou admin".to_string(),
        })
    }
}
