use application::transfer::{BookDto, CreateBookOutcome};
use askama::Template;

use crate::controller::Exhaust;
use crate::flash::Flash;
use crate::request::{AddBookRequest, FormErrors};

#[derive(Debug, Clone, PartialEq)]
pub struct BookResponse {
    id: i64,
    title: String,
    author: String,
    rating: f64,
}

impl BookResponse {
    /// Always carries a decimal point, `7.0` rather than `7`.
    pub fn rating_label(&self) -> String {
        let label = self.rating.to_string();
        if label.contains('.') {
            label
        } else {
            format!("{label}.0")
        }
    }
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        let BookDto {
            id,
            title,
            author,
            rating,
        } = value;
        Self {
            id,
            title,
            author,
            rating,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    books: Vec<BookResponse>,
    flashes: Vec<Flash>,
}

impl IndexPage {
    pub fn new(books: Vec<BookResponse>, flashes: Vec<Flash>) -> Self {
        Self { books, flashes }
    }
}

#[derive(Template)]
#[template(path = "add.html")]
pub struct AddBookPage {
    form: AddBookRequest,
    csrf_token: String,
    errors: FormErrors,
}

impl AddBookPage {
    pub fn new(form: AddBookRequest, csrf_token: String, errors: FormErrors) -> Self {
        Self {
            form,
            csrf_token,
            errors,
        }
    }
}

#[derive(Template)]
#[template(path = "edit-rating.html")]
pub struct EditRatingPage {
    book: BookResponse,
    new_rating: String,
    csrf_token: String,
    errors: FormErrors,
}

impl EditRatingPage {
    pub fn new(
        book: BookResponse,
        new_rating: String,
        csrf_token: String,
        errors: FormErrors,
    ) -> Self {
        Self {
            book,
            new_rating,
            csrf_token,
            errors,
        }
    }
}

pub struct BookPresenter;

impl Exhaust<Vec<BookDto>> for BookPresenter {
    type To = Vec<BookResponse>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        input.into_iter().map(BookResponse::from).collect()
    }
}

impl Exhaust<Option<BookDto>> for BookPresenter {
    type To = Option<BookResponse>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(BookResponse::from)
    }
}

impl Exhaust<CreateBookOutcome> for BookPresenter {
    type To = Flash;
    fn emit(&self, input: CreateBookOutcome) -> Self::To {
        match input {
            CreateBookOutcome::Created(book) => {
                Flash::success(format!("\"{}\" added to your collection.", book.title))
            }
            CreateBookOutcome::AlreadyExists { title } => {
                Flash::danger(format!("\"{title}\" is already in your collection."))
            }
        }
    }
}

pub struct RatingPresenter;

impl Exhaust<BookDto> for RatingPresenter {
    type To = Flash;
    fn emit(&self, _: BookDto) -> Self::To {
        Flash::success("Rating updated successfully!")
    }
}

pub struct DeletionPresenter;

impl Exhaust<BookDto> for DeletionPresenter {
    type To = Flash;
    fn emit(&self, input: BookDto) -> Self::To {
        Flash::success(format!("\"{}\" deleted successfully!", input.title))
    }
}
