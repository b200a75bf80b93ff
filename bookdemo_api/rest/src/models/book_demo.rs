use std::fmt::Display;

use bookdemo_models::book_demo::{
    DemoRequest, DemoRequestCompany, DemoRequestEmail, DemoRequestEmailError, DemoRequestFirstName,
    DemoRequestLastName, DemoRequestMessage, DemoRequestSubmission,
};
use serde_json::{Map, Value};

use super::ApiIssues;

/// Parse and validate the body of a demo request form submission.
///
/// The body is untrusted: invalid json and anything other than an object are
/// treated like an empty object. All fields are checked, so the returned
/// issues contain every problem at once.
pub fn parse_submission(body: &[u8]) -> Result<DemoRequestSubmission, ApiIssues> {
    let fields = match serde_json::from_slice(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    let mut parser = FieldParser {
        fields: &fields,
        issues: ApiIssues::new(),
    };

    let first_name = parser.text("firstName", DemoRequestFirstName::MAX_LENGTH, |x| {
        DemoRequestFirstName::try_new(x)
    });
    let last_name = parser.text("lastName", DemoRequestLastName::MAX_LENGTH, |x| {
        DemoRequestLastName::try_new(x)
    });
    let company = parser.text("company", DemoRequestCompany::MAX_LENGTH, |x| {
        DemoRequestCompany::try_new(x)
    });
    let email = parser.email("email");
    let message = parser.text("message", DemoRequestMessage::MAX_LENGTH, |x| {
        DemoRequestMessage::try_new(x)
    });
    let honeypot = parser.honeypot("website");

    match (first_name, last_name, company, email, message, honeypot) {
        (
            Some(first_name),
            Some(last_name),
            Some(company),
            Some(email),
            Some(message),
            Some(honeypot),
        ) => Ok(DemoRequestSubmission {
            request: DemoRequest {
                first_name,
                last_name,
                company,
                email,
                message,
            },
            honeypot,
        }),
        _ => Err(parser.issues),
    }
}

struct FieldParser<'a> {
    fields: &'a Map<String, Value>,
    issues: ApiIssues,
}

impl<'a> FieldParser<'a> {
    fn issue(&mut self, field: &'static str, message: impl Into<String>) {
        self.issues.entry(field).or_default().push(message.into());
    }

    fn string(&mut self, field: &'static str) -> Option<&'a str> {
        match self.fields.get(field) {
            None | Some(Value::Null) => {
                self.issue(field, "Required");
                None
            }
            Some(Value::String(value)) => Some(value),
            Some(_) => {
                self.issue(field, "Expected string");
                None
            }
        }
    }

    fn text<T, E: Display>(
        &mut self,
        field: &'static str,
        max_length: usize,
        new: impl FnOnce(&str) -> Result<T, E>,
    ) -> Option<T> {
        let value = self.string(field)?.trim();

        if value.is_empty() {
            self.issue(field, "Must not be empty");
            return None;
        }
        if value.chars().count() > max_length {
            self.issue(field, format!("Must be at most {max_length} characters"));
            return None;
        }

        new(value)
            .map_err(|err| self.issue(field, err.to_string()))
            .ok()
    }

    fn email(&mut self, field: &'static str) -> Option<DemoRequestEmail> {
        self.string(field)?
            .parse()
            .map_err(|err: DemoRequestEmailError| self.issue(field, err.to_string()))
            .ok()
    }

    /// The honeypot is optional, a missing value counts as empty.
    fn honeypot(&mut self, field: &'static str) -> Option<String> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Some(String::new()),
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                self.issue(field, "Expected string");
                None
            }
        }
    }
}
