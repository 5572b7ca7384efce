//! Declarative admin configuration: which fields each admin list shows,
//! how edit forms are grouped, and the list filters on copies.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{
        book::display_genre, Author, BookInstanceRecord, BookListing, Genre, Language, LoanStatus,
    },
    repository::DueBackBound,
};

/// Named group of fields on an edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Fieldset {
    /// Heading, if any
    pub name: Option<String>,
    pub fields: Vec<String>,
}

/// Admin registration of one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModelAdmin {
    pub model: String,
    /// Columns of the change list, in order
    pub list_display: Vec<String>,
    pub list_filter: Vec<String>,
    /// Form layout; fields sharing an inner list are shown on one line
    pub fields: Vec<Vec<String>>,
    pub fieldsets: Vec<Fieldset>,
    /// Related models edited inline
    pub inlines: Vec<String>,
}

fn names(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

impl ModelAdmin {
    /// Registration with defaults: the display string as only column
    fn default_for(model: &str) -> Self {
        Self {
            model: model.to_string(),
            list_display: names(&["__str__"]),
            list_filter: Vec::new(),
            fields: Vec::new(),
            fieldsets: Vec::new(),
            inlines: Vec::new(),
        }
    }

    pub fn genre() -> Self {
        Self::default_for("Genre")
    }

    pub fn language() -> Self {
        Self::default_for("Language")
    }

    pub fn author() -> Self {
        Self {
            list_display: names(&["last_name", "first_name", "date_of_birth", "date_of_death"]),
            fields: vec![
                names(&["first_name"]),
                names(&["last_name"]),
                names(&["date_of_birth", "date_of_death"]),
            ],
            inlines: names(&["Book"]),
            ..Self::default_for("Author")
        }
    }

    pub fn book() -> Self {
        Self {
            list_display: names(&["title", "author", "language", "isbn", "display_genre"]),
            inlines: names(&["BookInstance"]),
            ..Self::default_for("Book")
        }
    }

    pub fn book_instance() -> Self {
        Self {
            list_display: names(&["book", "status", "borrower", "due_back", "id"]),
            list_filter: names(&["status", "due_back"]),
            fieldsets: vec![
                Fieldset {
                    name: None,
                    fields: names(&["id", "book"]),
                },
                Fieldset {
                    name: Some("Availability".to_string()),
                    fields: names(&["status", "due_back", "borrower"]),
                },
            ],
            ..Self::default_for("BookInstance")
        }
    }
}

/// Every registered model, in registration order
pub fn registry() -> Vec<ModelAdmin> {
    vec![
        ModelAdmin::author(),
        ModelAdmin::book(),
        ModelAdmin::book_instance(),
        ModelAdmin::genre(),
        ModelAdmin::language(),
    ]
}

/// Change list row for models registered with defaults
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DefaultAdminRow {
    pub pk: i32,
    #[serde(rename = "__str__")]
    pub display: String,
}

impl From<Genre> for DefaultAdminRow {
    fn from(genre: Genre) -> Self {
        Self {
            pk: genre.id,
            display: genre.to_string(),
        }
    }
}

impl From<Language> for DefaultAdminRow {
    fn from(language: Language) -> Self {
        Self {
            pk: language.id,
            display: language.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorAdminRow {
    pub pk: i32,
    pub last_name: String,
    pub first_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl From<Author> for AuthorAdminRow {
    fn from(author: Author) -> Self {
        Self {
            pk: author.id,
            last_name: author.last_name,
            first_name: author.first_name,
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookAdminRow {
    pub pk: i32,
    pub title: String,
    /// Author display name
    pub author: Option<String>,
    pub language: Option<String>,
    pub isbn: String,
    pub display_genre: String,
}

impl From<BookListing> for BookAdminRow {
    fn from(book: BookListing) -> Self {
        Self {
            pk: book.id,
            display_genre: display_genre(&book.genres),
            title: book.title,
            author: book.author_name,
            language: book.language_name,
            isbn: book.isbn,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookInstanceAdminRow {
    pub pk: Uuid,
    /// "{id} ({title})"
    pub book: Option<String>,
    pub status: LoanStatus,
    /// Borrower username
    pub borrower: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub id: Uuid,
}

impl From<BookInstanceRecord> for BookInstanceAdminRow {
    fn from(record: BookInstanceRecord) -> Self {
        let book = record.book_title.as_ref().map(|_| record.to_string());
        Self {
            pk: record.instance.id,
            book,
            status: record.instance.status,
            borrower: record.borrower_username,
            due_back: record.instance.due_back,
            id: record.instance.id,
        }
    }
}

/// Date filter choices on the copy change list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DueBackFilter {
    Today,
    #[serde(rename = "past_7_days")]
    Past7Days,
    ThisMonth,
    ThisYear,
    NoDate,
    HasDate,
}

impl DueBackFilter {
    /// Resolve the choice to a concrete range around `today`
    pub fn bound(self, today: NaiveDate) -> DueBackBound {
        let tomorrow = today + Duration::days(1);
        match self {
            DueBackFilter::Today => DueBackBound::Between {
                from: today,
                until: tomorrow,
            },
            DueBackFilter::Past7Days => DueBackBound::Between {
                from: today - Duration::days(7),
                until: tomorrow,
            },
            DueBackFilter::ThisMonth => {
                let from = today.with_day(1).unwrap_or(today);
                let until = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                DueBackBound::Between {
                    from,
                    until: until.unwrap_or(tomorrow),
                }
            }
            DueBackFilter::ThisYear => {
                let from = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let until = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(tomorrow);
                DueBackBound::Between { from, until }
            }
            DueBackFilter::NoDate => DueBackBound::IsNull,
            DueBackFilter::HasDate => DueBackBound::NotNull,
        }
    }
}
