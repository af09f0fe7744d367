//! Sequential API test driver
//!
//! Every scenario goes through [`ApiTester::run_checked`], which sends one
//! request, compares the status, runs an optional body check and records the
//! outcome. Failures are printed and counted; nothing aborts the run.

use crate::check::{self, ActorFilter, CheckError, MovieFilter};
use crate::client::{ApiClient, ApiRequest, ClientError};
use crate::model::{Actor, EntityKind, Movie, NewActor, NewMovie};
use crate::multipart::FilePart;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Display;

/// Number of `/suggestions` calls compared by the consistency check
const CONSISTENCY_CALLS: usize = 3;

pub struct ApiTester {
    client: ApiClient,
    quiet: bool,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub failures: Vec<String>,
    pub created_actors: Vec<Actor>,
    pub created_movies: Vec<Movie>,
}

impl ApiTester {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            quiet: false,
            tests_run: 0,
            tests_passed: 0,
            failures: Vec::new(),
            created_actors: Vec::new(),
            created_movies: Vec::new(),
        }
    }

    /// Suppress progress lines (used for JSON output)
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    pub(crate) fn say(&self, line: impl Display) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    /// Send `request` and expect `expected_status`, with no body check
    pub fn run_test(
        &mut self,
        name: &str,
        request: ApiRequest,
        expected_status: u16,
    ) -> (bool, Value) {
        self.run_checked(name, request, expected_status, |_| Ok(()))
    }

    /// Send `request`, expect `expected_status`, then apply `check` to the JSON body
    ///
    /// Returns the success flag and the parsed body (`{}` when the body is not
    /// JSON or the test failed).
    pub fn run_checked<F>(
        &mut self,
        name: &str,
        request: ApiRequest,
        expected_status: u16,
        check: F,
    ) -> (bool, Value)
    where
        F: FnOnce(&Value) -> Result<(), CheckError>,
    {
        self.tests_run += 1;
        self.say(format!("\nTesting {}...", name));
        self.say(format!("   URL: {}", self.client.url_for(&request.endpoint)));

        let response = match self.client.send(&request) {
            Ok(response) => response,
            Err(e) => {
                self.say(format!("FAILED - Error: {}", e));
                self.record_failure(name, e);
                return (false, json!({}));
            }
        };

        if response.status != expected_status {
            self.say(format!(
                "FAILED - Expected {}, got {}",
                expected_status, response.status
            ));
            match response.json() {
                Some(detail) => self.say(format!("   Error: {}", detail)),
                None => self.say(format!("   Response: {}", response.body)),
            }
            self.record_failure(
                name,
                format!("expected status {}, got {}", expected_status, response.status),
            );
            return (false, json!({}));
        }

        let body = response.json().unwrap_or_else(|| json!({}));
        if let Err(e) = check(&body) {
            self.say(format!("FAILED - Status: {} but {}", response.status, e));
            self.record_failure(name, e);
            return (false, body);
        }

        self.tests_passed += 1;
        log::info!("passed: {}", name);
        self.say(format!("PASSED - Status: {}", response.status));
        if let Some(id) = body.as_object().and_then(|_| check::id_of(&body)) {
            self.say(format!("   Created ID: {}", id));
        }
        (true, body)
    }

    /// Count a check that needs no request of its own
    fn record_verdict(&mut self, name: &str, result: Result<(), CheckError>) -> bool {
        self.tests_run += 1;
        match result {
            Ok(()) => {
                self.tests_passed += 1;
                log::info!("passed: {}", name);
                true
            }
            Err(e) => {
                self.record_failure(name, e);
                false
            }
        }
    }

    /// Serialize a request body; a failure counts as a failed test named `name`
    fn encode_body<T: Serialize>(&mut self, name: &str, value: &T) -> Option<Value> {
        match serde_json::to_value(value) {
            Ok(payload) => Some(payload),
            Err(e) => {
                let e = ClientError::Encode(e);
                self.tests_run += 1;
                self.say(format!("\nTesting {}...", name));
                self.say(format!("FAILED - Error: {}", e));
                self.record_failure(name, e);
                None
            }
        }
    }

    fn record_failure(&mut self, name: &str, reason: impl Display) {
        log::warn!("failed: {}: {}", name, reason);
        self.failures.push(format!("{}: {}", name, reason));
    }

    pub fn create_actor(&mut self, actor: &NewActor) -> Option<String> {
        let name = format!("Create Actor - {}", actor.name);
        let payload = self.encode_body(&name, actor)?;
        let (success, body) = self.run_checked(
            &name,
            ApiRequest::post_json("actors", payload),
            200,
            |body| check::require_id(body).map(|_| ()),
        );
        if !success {
            return None;
        }
        let id = check::require_id(&body).ok()?;
        let created = serde_json::from_value::<Actor>(body).unwrap_or_else(|e| {
            log::warn!("created actor body not fully recognized: {}", e);
            Actor {
                name: actor.name.clone(),
                ..Default::default()
            }
        });
        self.created_actors.push(Actor {
            id: id.clone(),
            ..created
        });
        Some(id)
    }

    pub fn get_actors(&mut self, filter: &ActorFilter) -> (bool, Value) {
        let query = filter.to_query();
        let mut name = "Get Actors".to_string();
        if !filter.is_empty() {
            name.push_str(&format!(" with filters: {}", check::describe_query(&query)));
        }

        let result = self.run_checked(
            &name,
            ApiRequest::get("actors").with_filter(&query),
            200,
            |body| filter.check(body).map(|_| ()),
        );
        if result.0 {
            self.say(format!("   Found {} actors", count(&result.1)));
        }
        result
    }

    /// Fetch an actor and check its id, and its name when `expected` is given
    pub fn get_actor_by_id(&mut self, id: &str, expected: Option<&NewActor>) -> (bool, Value) {
        self.run_checked(
            &format!("Get Actor by ID - {}", id),
            ApiRequest::get(format!("actors/{}", id)),
            200,
            |body| {
                check::check_same_id(body, id)?;
                match expected {
                    Some(actor) => check::check_field(body, "nom", &json!(actor.name)),
                    None => Ok(()),
                }
            },
        )
    }

    pub fn create_movie(&mut self, movie: &NewMovie) -> Option<String> {
        let name = format!("Create Movie - {}", movie.name);
        let payload = self.encode_body(&name, movie)?;
        let (success, body) = self.run_checked(
            &name,
            ApiRequest::post_json("movies", payload),
            200,
            |body| check::require_id(body).map(|_| ()),
        );
        if !success {
            return None;
        }
        let id = check::require_id(&body).ok()?;
        let created = serde_json::from_value::<Movie>(body).unwrap_or_else(|e| {
            log::warn!("created movie body not fully recognized: {}", e);
            Movie {
                name: movie.name.clone(),
                ..Default::default()
            }
        });
        self.created_movies.push(Movie {
            id: id.clone(),
            ..created
        });
        Some(id)
    }

    pub fn get_movies(&mut self, filter: &MovieFilter) -> (bool, Value) {
        let query = filter.to_query();
        let mut name = "Get Movies".to_string();
        if !filter.is_empty() {
            name.push_str(&format!(" with filters: {}", check::describe_query(&query)));
        }

        let result = self.run_checked(
            &name,
            ApiRequest::get("movies").with_filter(&query),
            200,
            |body| filter.check(body).map(|_| ()),
        );
        if result.0 {
            self.say(format!("   Found {} movies", count(&result.1)));
        }
        result
    }

    pub fn get_movie_by_id(&mut self, id: &str, expected: Option<&NewMovie>) -> (bool, Value) {
        self.run_checked(
            &format!("Get Movie by ID - {}", id),
            ApiRequest::get(format!("movies/{}", id)),
            200,
            |body| {
                check::check_same_id(body, id)?;
                match expected {
                    Some(movie) => check::check_field(body, "nom", &json!(movie.name)),
                    None => Ok(()),
                }
            },
        )
    }

    pub fn global_search(&mut self, query: &str) -> (bool, Value) {
        let result = self.run_checked(
            &format!("Global Search - '{}'", query),
            ApiRequest::get("search").with_query("q", query),
            200,
            |body| {
                for key in ["actors", "movies"] {
                    if !body[key].is_array() {
                        return Err(CheckError::MissingField(key.to_string()));
                    }
                }
                Ok(())
            },
        );
        if result.0 {
            self.say(format!(
                "   Found {} actors, {} movies",
                check::list_len(&result.1, "actors"),
                check::list_len(&result.1, "movies")
            ));
        }
        result
    }

    pub fn get_genres(&mut self) -> (bool, Value) {
        self.get_listing("Get All Genres", "genres")
    }

    pub fn get_nationalities(&mut self) -> (bool, Value) {
        self.get_listing("Get All Nationalities", "nationalities")
    }

    /// `GET /{key}` returning `{key: [...]}`
    fn get_listing(&mut self, name: &str, key: &str) -> (bool, Value) {
        let result = self.run_checked(name, ApiRequest::get(key), 200, |body| {
            if body[key].is_array() {
                Ok(())
            } else {
                Err(CheckError::MissingField(key.to_string()))
            }
        });
        if result.0 {
            self.say(format!(
                "   Found {} {}: {}",
                check::list_len(&result.1, key),
                key,
                result.1[key]
            ));
        }
        result
    }

    pub fn daily_suggestions(&mut self) -> (bool, Value) {
        let mut report = None;
        let result = self.run_checked(
            "Get Daily Suggestions",
            ApiRequest::get("suggestions"),
            200,
            |body| {
                report = Some(check::check_suggestions(body)?);
                Ok(())
            },
        );
        if let Some(report) = report {
            self.say(format!("   Found {} suggested actors", report.actor_count));
            self.say(format!("   Found {} suggested movies", report.movie_count));
            self.say(format!("   Date: {}", report.date));
            self.say("   Date format is valid");
        }
        result
    }

    /// Call `/suggestions` repeatedly and require identical answers
    pub fn suggestions_consistency(&mut self) -> (bool, Value) {
        self.say("\nTesting suggestions consistency...");

        let mut responses = Vec::with_capacity(CONSISTENCY_CALLS);
        for call in 1..=CONSISTENCY_CALLS {
            let (success, body) = self.run_test(
                &format!("Daily Suggestions Call #{}", call),
                ApiRequest::get("suggestions"),
                200,
            );
            if !success {
                return (false, json!({}));
            }
            responses.push(body);
        }

        let verdict = check::check_consistency(&responses);
        match &verdict {
            Ok(()) => self.say("   All responses are consistent for the same day"),
            Err(e) => self.say(format!("   Responses are not consistent: {}", e)),
        }
        if self.record_verdict("Suggestions Consistency", verdict) {
            (true, responses.swap_remove(0))
        } else {
            (false, json!({}))
        }
    }

    /// Report what the current database offers; asserts only the status
    pub fn suggestions_current_state(&mut self) -> (bool, Value) {
        let result = self.run_test(
            "Daily Suggestions (Current Database State)",
            ApiRequest::get("suggestions"),
            200,
        );
        if result.0 {
            let actors = check::list_len(&result.1, "actors");
            let movies = check::list_len(&result.1, "movies");
            self.say(format!(
                "   Database has {} actors available for suggestions",
                actors
            ));
            self.say(format!(
                "   Database has {} movies available for suggestions",
                movies
            ));
            if actors == 0 && movies == 0 {
                self.say("   Endpoint handles an empty selection");
            } else {
                self.say("   Endpoint returns available data");
            }
        }
        result
    }

    pub fn upload_photo(&mut self, kind: EntityKind, id: &str, part: FilePart) -> (bool, Value) {
        let result = self.run_checked(
            &format!("Upload {} Photo - {}", kind.label(), id),
            ApiRequest::upload(format!("{}/{}/photo", kind.collection(), id), part),
            200,
            |body| check::check_photo_url(body).map(|_| ()),
        );
        if result.0 {
            self.say(format!("   Photo URL: {}", result.1["photo_url"]));
        }
        result
    }

    pub fn update_actor(&mut self, id: &str, actor: &NewActor) -> (bool, Value) {
        let name = format!("Update Actor - {}", id);
        let Some(payload) = self.encode_body(&name, actor) else {
            return (false, json!({}));
        };
        self.run_checked(
            &name,
            ApiRequest::put_json(format!("actors/{}", id), payload),
            200,
            |body| {
                check::check_same_id(body, id)?;
                check::check_field(body, "nom", &json!(actor.name))?;
                check::check_field(body, "age", &json!(actor.age))
            },
        )
    }

    pub fn update_movie(&mut self, id: &str, movie: &NewMovie) -> (bool, Value) {
        let name = format!("Update Movie - {}", id);
        let Some(payload) = self.encode_body(&name, movie) else {
            return (false, json!({}));
        };
        self.run_checked(
            &name,
            ApiRequest::put_json(format!("movies/{}", id), payload),
            200,
            |body| {
                check::check_same_id(body, id)?;
                check::check_field(body, "nom", &json!(movie.name))?;
                check::check_field(body, "annee", &json!(movie.year))
            },
        )
    }

    /// Delete an entity, then require that fetching it returns 404
    pub fn delete_entity(&mut self, kind: EntityKind, id: &str) -> bool {
        let path = format!("{}/{}", kind.collection(), id);
        let (deleted, _) = self.run_test(
            &format!("Delete {} - {}", kind.label(), id),
            ApiRequest::delete(path.clone()),
            200,
        );
        if !deleted {
            return false;
        }
        let (gone, _) = self.run_test(
            &format!("Get Deleted {} - {}", kind.label(), id),
            ApiRequest::get(path),
            404,
        );
        gone
    }
}

fn count(body: &Value) -> usize {
    body.as_array().map(Vec::len).unwrap_or(0)
}
