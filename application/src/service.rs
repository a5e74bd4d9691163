mod book;
mod url;

pub use self::{book::*, url::*};
