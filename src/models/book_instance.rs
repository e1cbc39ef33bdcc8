//! Book instance (physical copy) model and loan status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Availability of a single copy.
///
/// Persisted as the single-character codes `'m'` / `'o'` / `'a'` / `'r'`
/// inherited from the legacy catalog data; everything above the storage
/// boundary works with this enum only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Maintenance,
    Borrowed,
    Available,
    Reserved,
}

impl LoanStatus {
    /// Storage code for this status
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::Borrowed => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LoanStatus::Available)
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, LoanStatus::Borrowed)
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Available
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::Borrowed => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::Borrowed),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

// SQLx conversions: the column is a one-character text code
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full book instance model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Copy identifier, assigned at creation
    pub id: Uuid,
    pub book_id: Option<i32>,
    /// Publisher / edition note
    pub imprint: String,
    pub language_id: Option<i32>,
    pub status: LoanStatus,
    /// Scheduled return date; set while the copy is out, cleared on return
    pub due_back: Option<NaiveDate>,
    /// User currently holding the copy; set only while status is `borrowed`
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    /// Whether the scheduled return date has passed
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|d| d < today).unwrap_or(false)
    }
}

/// Book instance with joined display fields for listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub language: Option<String>,
    pub status: LoanStatus,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
}

/// Create book instance request (librarian)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub language_id: Option<i32>,
}

/// Update book instance request. Only the imprint and language can be
/// edited directly; status, borrower and due date move through the
/// circulation endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub language_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::Borrowed,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(status.code().parse::<LoanStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_code_rejected() {
        assert!("x".parse::<LoanStatus>().is_err());
        assert!("".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_default_status_is_available() {
        assert_eq!(LoanStatus::default(), LoanStatus::Available);
        assert!(LoanStatus::default().is_available());
    }
}
