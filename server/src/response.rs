mod book;
mod page;

pub use self::{book::*, page::*};
