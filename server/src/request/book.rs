use std::ops::RangeInclusive;

use application::transfer::{CreateBookDto, DeleteBookDto, GetBookDto, UpdateBookRatingDto};
use serde::Deserialize;
use vodca::References;

use crate::controller::{Intake, TryIntake};
use crate::request::{FormErrors, Submitted};

const CREATE_RATING_RANGE: RangeInclusive<f64> = 1.0..=10.0;
const UPDATE_RATING_RANGE: RangeInclusive<f64> = 0.0..=10.0;
const INVALID_NUMBER: &str = "Not a valid float value.";

#[derive(Debug, Clone, Default, Deserialize, References)]
#[serde(default)]
pub struct AddBookRequest {
    title: String,
    author: String,
    rating: String,
    csrf_token: String,
}

// `new_rating` stays optional so that an absent field and an empty one can be told apart.
#[derive(Debug, Clone, Default, Deserialize, References)]
#[serde(default)]
pub struct UpdateRatingRequest {
    new_rating: Option<String>,
    csrf_token: String,
}

#[derive(Debug)]
pub struct GetBookRequest {
    id: i64,
}

impl GetBookRequest {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    id: i64,
}

impl DeleteBookRequest {
    /// Reads the `id=<integer>` path segment.
    pub fn parse(segment: &str) -> Option<Self> {
        let id = segment.strip_prefix("id=")?.parse().ok()?;
        Some(Self { id })
    }
}

pub struct BookTransformer;

impl TryIntake<AddBookRequest> for BookTransformer {
    type To = CreateBookDto;
    type Error = FormErrors;
    fn emit(&self, input: AddBookRequest) -> Result<Self::To, Self::Error> {
        let mut errors = FormErrors::default();

        // Whitespace alone counts as missing; accepted values are kept verbatim.
        if input.title.trim().is_empty() {
            errors.push("title", "Enter a book title");
        }
        if input.author.trim().is_empty() {
            errors.push("author", "Missing author's name");
        }
        let rating = match Submitted::parse(&input.rating) {
            Submitted::Blank => {
                errors.push("rating", "Add a valid rating");
                None
            }
            Submitted::Invalid => {
                errors.push("rating", INVALID_NUMBER);
                None
            }
            Submitted::Number(rating) if !CREATE_RATING_RANGE.contains(&rating) => {
                errors.push("rating", "Rating must be between 1 and 10");
                None
            }
            Submitted::Number(rating) => Some(rating),
        };

        match rating {
            Some(rating) if errors.is_empty() => Ok(CreateBookDto {
                title: input.title,
                author: input.author,
                rating,
            }),
            _ => Err(errors),
        }
    }
}

impl TryIntake<(i64, UpdateRatingRequest)> for BookTransformer {
    type To = UpdateBookRatingDto;
    type Error = FormErrors;
    fn emit(&self, input: (i64, UpdateRatingRequest)) -> Result<Self::To, Self::Error> {
        let (id, input) = input;
        let mut errors = FormErrors::default();

        let raw = input.new_rating.unwrap_or_default();
        if raw.is_empty() {
            errors.push("new_rating", "This field is required.");
            return Err(errors);
        }
        match Submitted::parse(&raw) {
            Submitted::Number(rating) if UPDATE_RATING_RANGE.contains(&rating) => {
                Ok(UpdateBookRatingDto { id, rating })
            }
            Submitted::Number(_) => {
                errors.push("new_rating", "Number must be between 0 and 10.");
                Err(errors)
            }
            Submitted::Blank | Submitted::Invalid => {
                errors.push("new_rating", INVALID_NUMBER);
                Err(errors)
            }
        }
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { id: input.id }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { id: input.id }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn add(title: &str, author: &str, rating: &str) -> Result<CreateBookDto, FormErrors> {
        let request = AddBookRequest {
            title: title.to_string(),
            author: author.to_string(),
            rating: rating.to_string(),
            csrf_token: String::new(),
        };
        TryIntake::emit(&BookTransformer, request)
    }

    fn update(new_rating: Option<&str>) -> Result<UpdateBookRatingDto, FormErrors> {
        let request = UpdateRatingRequest {
            new_rating: new_rating.map(str::to_string),
            csrf_token: String::new(),
        };
        TryIntake::emit(&BookTransformer, (7, request))
    }

    #[test]
    fn add_keeps_fields_verbatim() {
        let dto = add("Dune ", "Frank Herbert", "9.5").unwrap();
        assert_eq!(
            dto,
            CreateBookDto {
                title: "Dune ".to_string(),
                author: "Frank Herbert".to_string(),
                rating: 9.5,
            }
        );
    }

    #[test]
    fn add_accepts_inclusive_bounds() {
        assert!(add("Dune", "Frank Herbert", "1").is_ok());
        assert!(add("Dune", "Frank Herbert", "10").is_ok());
    }

    #[test]
    fn add_rejects_rating_outside_one_to_ten() {
        for rating in ["0", "0.99", "10.01", "-3", "11"] {
            let errors = add("Dune", "Frank Herbert", rating).unwrap_err();
            assert_eq!(errors.field("rating"), ["Rating must be between 1 and 10"]);
        }
    }

    #[test]
    fn add_reports_every_failing_field() {
        let errors = add(" ", "", "").unwrap_err();
        assert_eq!(errors.field("title"), ["Enter a book title"]);
        assert_eq!(errors.field("author"), ["Missing author's name"]);
        assert_eq!(errors.field("rating"), ["Add a valid rating"]);
    }

    #[test]
    fn add_rejects_non_numeric_rating() {
        for rating in ["nine", "NaN", "inf", "9,5"] {
            let errors = add("Dune", "Frank Herbert", rating).unwrap_err();
            assert_eq!(errors.field("rating"), [INVALID_NUMBER]);
            assert!(errors.field("title").is_empty());
        }
    }

    #[test]
    fn update_accepts_zero_to_ten() {
        assert_eq!(update(Some("0")).unwrap(), UpdateBookRatingDto { id: 7, rating: 0.0 });
        assert_eq!(update(Some("10")).unwrap().rating, 10.0);
        assert_eq!(update(Some("7.0")).unwrap().rating, 7.0);
    }

    #[test]
    fn update_rejects_rating_outside_zero_to_ten() {
        for rating in ["-0.1", "10.5", "100"] {
            let errors = update(Some(rating)).unwrap_err();
            assert_eq!(errors.field("new_rating"), ["Number must be between 0 and 10."]);
        }
    }

    #[test]
    fn update_requires_input() {
        for rating in [None, Some("")] {
            let errors = update(rating).unwrap_err();
            assert_eq!(errors.field("new_rating"), ["This field is required."]);
        }
        let errors = update(Some("   ")).unwrap_err();
        assert_eq!(errors.field("new_rating"), [INVALID_NUMBER]);
    }

    #[test]
    fn delete_segment_must_carry_id() {
        assert_eq!(DeleteBookRequest::parse("id=12").map(|r| r.id), Some(12));
        assert!(DeleteBookRequest::parse("12").is_none());
        assert!(DeleteBookRequest::parse("id=").is_none());
        assert!(DeleteBookRequest::parse("id=abc").is_none());
    }
}
