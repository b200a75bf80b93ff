use std::collections::BTreeMap;

use serde::Serialize;

pub mod book_demo;

#[derive(Serialize)]
pub struct ApiError {
    pub error: &'static str,
}

/// Validation issues of a request body, keyed by field name
pub type ApiIssues = BTreeMap<&'static str, Vec<String>>;

#[derive(Serialize)]
pub struct ApiInvalidInput {
    pub error: &'static str,
    pub issues: ApiIssues,
}

#[derive(Serialize)]
pub struct ApiOk {
    pub ok: bool,
}
