//! Payload checks applied to successful responses
//!
//! Each check takes a parsed JSON body and returns `Ok` or a [`CheckError`]
//! describing the first violation found.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Maximum number of actors and of movies in a suggestions payload
pub const MAX_SUGGESTIONS: usize = 6;

const SUGGESTION_KEYS: [&str; 3] = ["actors", "movies", "date"];

#[derive(Error, Debug, PartialEq)]
pub enum CheckError {
    #[error("Expected a JSON array, got {0}")]
    NotAnArray(String),

    #[error("Missing required keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("Missing or empty field '{0}'")]
    MissingField(String),

    #[error("Too many {kind} returned: {count} (max {max})")]
    TooMany {
        kind: &'static str,
        count: usize,
        max: usize,
    },

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Expected id {expected}, got {actual}")]
    IdMismatch { expected: String, actual: String },

    #[error("Expected {field} = {expected}, got {actual}")]
    FieldMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Entry {id} does not match filter {field}: {reason}")]
    FilterMismatch {
        id: String,
        field: &'static str,
        reason: String,
    },

    #[error("Response #{index} differs from first response: {reason}")]
    SuggestionsDiffer { index: usize, reason: String },
}

/// Query filters accepted by `GET /actors`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorFilter {
    pub search: Option<String>,
    pub nationality: Option<String>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
}

/// Query filters accepted by `GET /movies`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

impl ActorFilter {
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(nationality) = &self.nationality {
            query.push(("nationalite", nationality.clone()));
        }
        if let Some(age_min) = self.age_min {
            query.push(("age_min", age_min.to_string()));
        }
        if let Some(age_max) = self.age_max {
            query.push(("age_max", age_max.to_string()));
        }
        query
    }

    /// Every entry must satisfy the exact-match and range filters
    ///
    /// `search` is free text matched by the server and is not re-checked here.
    pub fn check(&self, body: &Value) -> Result<usize, CheckError> {
        let entries = as_array(body)?;
        for entry in entries {
            let id = id_of(entry).unwrap_or_else(|| "<no id>".to_string());
            if let Some(nationality) = &self.nationality {
                let actual = entry["nationalite"].as_str().unwrap_or_default();
                if actual != nationality {
                    return Err(CheckError::FilterMismatch {
                        id,
                        field: "nationalite",
                        reason: format!("expected '{}', got '{}'", nationality, actual),
                    });
                }
            }
            if self.age_min.is_some() || self.age_max.is_some() {
                let age = entry["age"].as_f64().ok_or_else(|| CheckError::FilterMismatch {
                    id: id.clone(),
                    field: "age",
                    reason: "age missing".to_string(),
                })?;
                let below = self.age_min.is_some_and(|min| age < f64::from(min));
                let above = self.age_max.is_some_and(|max| age > f64::from(max));
                if below || above {
                    return Err(CheckError::FilterMismatch {
                        id,
                        field: "age",
                        reason: format!(
                            "{} outside {}..={}",
                            age,
                            self.age_min.map(|v| v.to_string()).unwrap_or_default(),
                            self.age_max.map(|v| v.to_string()).unwrap_or_default()
                        ),
                    });
                }
            }
        }
        Ok(entries.len())
    }
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(genre) = &self.genre {
            query.push(("genre", genre.clone()));
        }
        if let Some(year) = self.year {
            query.push(("annee", year.to_string()));
        }
        query
    }

    pub fn check(&self, body: &Value) -> Result<usize, CheckError> {
        let entries = as_array(body)?;
        for entry in entries {
            let id = id_of(entry).unwrap_or_else(|| "<no id>".to_string());
            if let Some(genre) = &self.genre {
                let actual = entry["genre"].as_str().unwrap_or_default();
                if actual != genre {
                    return Err(CheckError::FilterMismatch {
                        id,
                        field: "genre",
                        reason: format!("expected '{}', got '{}'", genre, actual),
                    });
                }
            }
            if let Some(year) = self.year {
                let actual = entry["annee"].as_i64();
                if actual != Some(i64::from(year)) {
                    return Err(CheckError::FilterMismatch {
                        id,
                        field: "annee",
                        reason: format!("expected {}, got {}", year, entry["annee"]),
                    });
                }
            }
        }
        Ok(entries.len())
    }
}

/// Human-readable `key=value` list, e.g. `{nationalite=Française}`
pub fn describe_query(query: &[(&str, String)]) -> String {
    let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", pairs.join(", "))
}

/// The `id` of an object, accepting string or numeric ids
pub fn id_of(value: &Value) -> Option<String> {
    match &value["id"] {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn require_id(body: &Value) -> Result<String, CheckError> {
    id_of(body).ok_or_else(|| CheckError::MissingField("id".to_string()))
}

/// The body must describe the entity with `expected_id`
pub fn check_same_id(body: &Value, expected_id: &str) -> Result<(), CheckError> {
    let actual = require_id(body)?;
    if actual != expected_id {
        return Err(CheckError::IdMismatch {
            expected: expected_id.to_string(),
            actual,
        });
    }
    Ok(())
}

/// A string or integer field must equal `expected`
pub fn check_field(body: &Value, field: &str, expected: &Value) -> Result<(), CheckError> {
    let actual = &body[field];
    if actual != expected {
        return Err(CheckError::FieldMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Upload responses must carry a non-empty `photo_url`
pub fn check_photo_url(body: &Value) -> Result<String, CheckError> {
    match body["photo_url"].as_str() {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(CheckError::MissingField("photo_url".to_string())),
    }
}

/// Length of the array under `key`, or zero when absent
pub fn list_len(body: &Value, key: &str) -> usize {
    body[key].as_array().map(Vec::len).unwrap_or(0)
}

/// Parse the date forms Python's `fromisoformat` accepts
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Summary of a valid suggestions payload
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    pub date: String,
    pub actor_ids: BTreeSet<String>,
    pub movie_ids: BTreeSet<String>,
    pub actor_count: usize,
    pub movie_count: usize,
}

/// Validate shape, caps and date of a `/suggestions` body
pub fn check_suggestions(body: &Value) -> Result<Suggestions, CheckError> {
    let missing: Vec<String> = SUGGESTION_KEYS
        .iter()
        .filter(|key| body.get(**key).is_none())
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CheckError::MissingKeys(missing));
    }

    let actors = as_array(&body["actors"])?;
    let movies = as_array(&body["movies"])?;
    if actors.len() > MAX_SUGGESTIONS {
        return Err(CheckError::TooMany {
            kind: "actors",
            count: actors.len(),
            max: MAX_SUGGESTIONS,
        });
    }
    if movies.len() > MAX_SUGGESTIONS {
        return Err(CheckError::TooMany {
            kind: "movies",
            count: movies.len(),
            max: MAX_SUGGESTIONS,
        });
    }

    let date = body["date"].as_str().unwrap_or_default();
    if parse_iso_date(date).is_none() {
        return Err(CheckError::InvalidDate(body["date"].to_string()));
    }

    Ok(Suggestions {
        date: date.to_string(),
        actor_ids: actors.iter().filter_map(id_of).collect(),
        movie_ids: movies.iter().filter_map(id_of).collect(),
        actor_count: actors.len(),
        movie_count: movies.len(),
    })
}

/// Every response must match the first on date and identifier sets
///
/// `responses` holds the raw bodies in call order; indices in errors are 1-based.
pub fn check_consistency(responses: &[Value]) -> Result<(), CheckError> {
    let Some((first, rest)) = responses.split_first() else {
        return Ok(());
    };
    let first_ids = ids_by_list(first);

    for (offset, response) in rest.iter().enumerate() {
        let index = offset + 2;
        if response["date"] != first["date"] {
            return Err(CheckError::SuggestionsDiffer {
                index,
                reason: format!("date {} vs {}", response["date"], first["date"]),
            });
        }
        if list_len(response, "actors") != list_len(first, "actors")
            || list_len(response, "movies") != list_len(first, "movies")
        {
            return Err(CheckError::SuggestionsDiffer {
                index,
                reason: "different number of suggestions".to_string(),
            });
        }
        if ids_by_list(response) != first_ids {
            return Err(CheckError::SuggestionsDiffer {
                index,
                reason: "different suggestions".to_string(),
            });
        }
    }
    Ok(())
}

fn ids_by_list(body: &Value) -> (BTreeSet<String>, BTreeSet<String>) {
    let ids = |key: &str| -> BTreeSet<String> {
        body[key]
            .as_array()
            .map(|list| list.iter().filter_map(id_of).collect())
            .unwrap_or_default()
    };
    (ids("actors"), ids("movies"))
}

fn as_array(value: &Value) -> Result<&Vec<Value>, CheckError> {
    value.as_array().ok_or_else(|| {
        let kind = match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Object(_) => "an object",
            Value::Array(_) => "an array",
        };
        CheckError::NotAnArray(kind.to_string())
    })
}
