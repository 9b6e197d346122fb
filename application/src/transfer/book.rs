use kernel::prelude::entity::{Book, DestructBook};

#[derive(Debug, Clone, PartialEq)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub rating: f64,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            author,
            rating,
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            rating: rating.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateBookOutcome {
    Created(BookDto),
    /// Another book already owns the title; nothing was written.
    AlreadyExists { title: String },
}

pub struct GetBookDto {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBookRatingDto {
    pub id: i64,
    pub rating: f64,
}

pub struct DeleteBookDto {
    pub id: i64,
}
