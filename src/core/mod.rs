//! Pure domain logic shared by the upstream client and the query service.

pub mod citation;

pub use citation::{Citation, RawAnnotation, URL_CITATION, extract_citations};
