mod affected;
mod time;
mod version;

pub use self::{affected::*, time::*, version::*};
