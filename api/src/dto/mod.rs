mod requests;
mod responses;

pub use self::{requests::*, responses::*};
