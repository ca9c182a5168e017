//! One function per backend operation. Each maps a domain call to a single
//! [`ApiClient`](crate::client::ApiClient) request; request validation is
//! left to the caller.

pub mod exam;
pub mod file;
pub mod score;
pub mod student;
