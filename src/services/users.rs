//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    lending::{rules, ActiveLoan},
    models::{
        user::{AccountType, CreateUser, UserClaims, UserDetails},
        User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a user by username and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;

        Ok((token, user))
    }

    /// Create a JWT token for a user
    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            account_type: user.account_type,
            can_mark_returned: user.can_mark_returned,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Create a new user account
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        if self.repository.users.username_exists(&user.username).await? {
            return Err(AppError::duplicate("username", "Username already exists"));
        }

        let password_hash = self.hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &password_hash).await?;

        tracing::info!("Created user {} ({})", created.username, created.id);

        Ok(created)
    }

    /// Create the default librarian account when the users table is empty.
    /// Gives a fresh install a way to log in and create real accounts.
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let admin = CreateUser {
            username: "admin".to_string(),
            password: "admin".to_string(),
            first_name: Some("Library".to_string()),
            last_name: Some("Admin".to_string()),
            email: Some("admin@xulambis.example".to_string()),
            account_type: Some(AccountType::Librarian),
            can_mark_returned: Some(true),
        };
        self.create_user(admin).await?;

        tracing::warn!("Created default librarian 'admin' with password 'admin'; change it");

        Ok(())
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Get a user with loan counters and borrowing eligibility
    pub async fn get_details(&self, id: i32) -> AppResult<UserDetails> {
        let user = self.repository.users.get_by_id(id).await?;
        let instances = self.repository.instances.get_loans_for(id).await?;

        let today = Utc::now().date_naive();
        let loans: Vec<ActiveLoan> = instances.iter().map(ActiveLoan::from).collect();
        let nb_overdue = loans.iter().filter(|l| l.is_overdue(today)).count() as i64;

        Ok(UserDetails {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            account_type: user.account_type,
            can_mark_returned: user.can_mark_returned,
            nb_loans: loans.len() as i64,
            nb_overdue,
            can_borrow_book: rules::can_borrow(&loans, today),
        })
    }
}
