//! Unit specifications for the submission lifecycle, exercised through the
//! service facade and the HTTP router without reaching into storage.

mod common;
mod routing;
