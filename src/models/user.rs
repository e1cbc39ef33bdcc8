//! User model, account types and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Account types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Member,
    Librarian,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Member => "member",
            AccountType::Librarian => "librarian",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(AccountType::Member),
            "librarian" => Ok(AccountType::Librarian),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

// SQLx conversion for AccountType
impl sqlx::Type<Postgres> for AccountType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for AccountType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AccountType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub account_type: AccountType,
    /// Grant for the renewal workflow and the all-borrowed listing
    pub can_mark_returned: bool,
    pub crea_date: DateTime<Utc>,
}

/// User detail with loan counters and borrowing eligibility
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetails {
    pub id: i32,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub account_type: AccountType,
    pub can_mark_returned: bool,
    /// Copies currently held
    pub nb_loans: i64,
    /// Held copies past their due date
    pub nb_overdue: i64,
    /// Whether a new borrow would currently be granted
    pub can_borrow_book: bool,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 150, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub account_type: Option<AccountType>,
    pub can_mark_returned: Option<bool>,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub can_mark_returned: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_librarian(&self) -> bool {
        self.account_type == AccountType::Librarian
    }

    /// Catalog management is reserved to librarian accounts
    pub fn require_librarian(&self) -> Result<(), AppError> {
        if self.is_librarian() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Librarian account required".to_string(),
            ))
        }
    }

    /// The renewal workflow and the all-borrowed listing need an explicit
    /// capability grant, independent of the account type
    pub fn require_mark_returned(&self) -> Result<(), AppError> {
        if self.can_mark_returned {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Missing 'mark returned' capability".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(account_type: AccountType, can_mark_returned: bool) -> UserClaims {
        UserClaims {
            sub: "test".to_string(),
            user_id: 1,
            account_type,
            can_mark_returned,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_librarian_gate() {
        assert!(claims(AccountType::Librarian, false).require_librarian().is_ok());
        assert!(claims(AccountType::Member, true).require_librarian().is_err());
    }

    #[test]
    fn test_mark_returned_is_a_grant_not_a_role() {
        // A librarian without the grant cannot renew; a member with it can.
        assert!(claims(AccountType::Librarian, false).require_mark_returned().is_err());
        assert!(claims(AccountType::Member, true).require_mark_returned().is_ok());
    }

    #[test]
    fn test_account_type_round_trip() {
        assert_eq!("member".parse::<AccountType>().unwrap(), AccountType::Member);
        assert_eq!("Librarian".parse::<AccountType>().unwrap(), AccountType::Librarian);
        assert!("admin".parse::<AccountType>().is_err());
    }
}
