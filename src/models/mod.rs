//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod enums;
pub mod genre;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetail, AuthorInput};
pub use book::{Book, BookDetail, BookInput, BookListing};
pub use book_instance::{BookInstance, BookInstanceInput, BookInstanceRecord, BookInstanceView};
pub use enums::LoanStatus;
pub use genre::{Genre, GenreInput, Language, LanguageInput};
pub use user::{Caller, Permission, User, UserClaims};
