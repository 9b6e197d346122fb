mod author;
mod id;
mod rating;
mod title;

pub use self::{author::*, id::*, rating::*, title::*};
use destructure::{Destructure, Mutation};
use vodca::References;

#[derive(Debug, Clone, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: BookAuthor,
    rating: BookRating,
}

impl Book {
    pub fn new(id: BookId, title: BookTitle, author: BookAuthor, rating: BookRating) -> Self {
        Self {
            id,
            title,
            author,
            rating,
        }
    }
}

/// A book that has not been stored yet. The id is assigned by storage on insert.
#[derive(Debug, Clone, PartialEq, References, Destructure)]
pub struct NewBook {
    title: BookTitle,
    author: BookAuthor,
    rating: BookRating,
}

impl NewBook {
    pub fn new(title: BookTitle, author: BookAuthor, rating: BookRating) -> Self {
        Self {
            title,
            author,
            rating,
        }
    }

    pub fn into_book(self, id: BookId) -> Book {
        let DestructNewBook {
            title,
            author,
            rating,
        } = self.into_destruct();
        Book::new(id, title, author, rating)
    }
}
