//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;

/// Author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Born
    pub date_of_birth: Option<NaiveDate>,
    /// Died
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First" form used in lists
    pub fn display_name(&self) -> String {
        display_name(&self.last_name, &self.first_name)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

pub fn display_name(last_name: &str, first_name: &str) -> String {
    format!("{}, {}", last_name, first_name)
}

/// Natural author order: last name, then first name, then id
pub fn author_order(a: &Author, b: &Author) -> std::cmp::Ordering {
    (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Create or update author request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i32, first: &str, last: &str) -> Author {
        Author {
            id,
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(author(1, "Ursula", "Le Guin").to_string(), "Le Guin, Ursula");
    }

    #[test]
    fn test_author_order() {
        let mut authors = vec![
            author(1, "Terry", "Pratchett"),
            author(2, "Iain", "Banks"),
            author(3, "Anne", "Banks"),
        ];
        authors.sort_by(author_order);
        let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
