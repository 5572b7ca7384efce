//! Shared domain enums

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgTypeInfo, Decode, Encode, Postgres};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Availability of a single book copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Available,
    #[default]
    Maintenance,
    Reserved,
    OnLoan,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Available,
        LoanStatus::Maintenance,
        LoanStatus::Reserved,
        LoanStatus::OnLoan,
    ];

    /// Single-character code stored in `book_instances.status`
    pub fn code(&self) -> char {
        match self {
            LoanStatus::Available => 'a',
            LoanStatus::Maintenance => 'm',
            LoanStatus::Reserved => 'r',
            LoanStatus::OnLoan => 'o',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'a' => Some(LoanStatus::Available),
            'm' => Some(LoanStatus::Maintenance),
            'r' => Some(LoanStatus::Reserved),
            'o' => Some(LoanStatus::OnLoan),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Available => "Available",
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::Reserved => "Reserved",
            LoanStatus::OnLoan => "On-Loan",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    /// Accepts the stored code, the snake-case name or the display label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(status) = LoanStatus::from_code(c) {
                return Ok(status);
            }
        }
        match s.to_lowercase().as_str() {
            "available" => Ok(LoanStatus::Available),
            "maintenance" => Ok(LoanStatus::Maintenance),
            "reserved" => Ok(LoanStatus::Reserved),
            "on_loan" | "on-loan" => Ok(LoanStatus::OnLoan),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion: CHAR(1) code column
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, Postgres>>::decode(value)?;
        s.trim().parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}
