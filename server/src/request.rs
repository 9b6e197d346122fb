mod book;
mod form;

pub use self::{book::*, form::*};
