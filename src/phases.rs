//! The fixed scenario list, grouped into phases
//!
//! Phases share the ids created by earlier phases through [`RunState`].
//! Scenarios whose id is unavailable are skipped and not counted.

use crate::check::{ActorFilter, MovieFilter};
use crate::cli::Phase;
use crate::model::{self, EntityKind, NewActor, NewMovie};
use crate::multipart::{FilePart, MultipartError};
use crate::tester::ApiTester;
use std::path::Path;

/// Multipart field name the upload endpoints read
const UPLOAD_FIELD: &str = "file";

/// What a run should do beyond the defaults
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub phases: Vec<Phase>,
    pub photo: FilePart,
}

impl RunPlan {
    /// Selected phases in canonical order; empty `selected` means every phase
    /// except cleanup, which runs only when `cleanup` is set or it is named.
    pub fn new(selected: &[Phase], cleanup: bool, photo: FilePart) -> Self {
        let phases = Phase::ALL
            .into_iter()
            .filter(|phase| {
                if selected.is_empty() {
                    *phase != Phase::Cleanup || cleanup
                } else {
                    selected.contains(phase) || (*phase == Phase::Cleanup && cleanup)
                }
            })
            .collect();
        Self { phases, photo }
    }

    pub fn default_photo() -> FilePart {
        FilePart::sample_png(UPLOAD_FIELD)
    }

    pub fn photo_from_path(path: &Path) -> Result<FilePart, MultipartError> {
        FilePart::from_path(UPLOAD_FIELD, path)
    }
}

/// Ids created during the run
#[derive(Debug, Default)]
struct RunState {
    actor1: Option<String>,
    actor2: Option<String>,
    movie1: Option<String>,
    movie2: Option<String>,
}

pub fn run(tester: &mut ApiTester, plan: &RunPlan) {
    let mut state = RunState::default();
    for (index, phase) in plan.phases.iter().enumerate() {
        tester.say(format!("\nPHASE {}: {}", index + 1, phase.title()));
        tester.say("-".repeat(40));
        log::info!("starting phase {}", phase);

        match phase {
            Phase::Actors => actors_phase(tester, &mut state),
            Phase::Movies => movies_phase(tester, &mut state),
            Phase::Search => search_phase(tester),
            Phase::Suggestions => suggestions_phase(tester),
            Phase::Uploads => uploads_phase(tester, &state, &plan.photo),
            Phase::Cleanup => cleanup_phase(tester, &state),
        }
    }
}

fn actors_phase(tester: &mut ApiTester, state: &mut RunState) {
    let actor1 = model::sample_actor();
    state.actor1 = tester.create_actor(&actor1);
    state.actor2 = tester.create_actor(&model::sample_actor2());

    tester.get_actors(&ActorFilter::default());

    if let Some(id) = state.actor1.clone() {
        tester.get_actor_by_id(&id, Some(&actor1));
    }

    tester.get_actors(&ActorFilter {
        search: Some("Marion".to_string()),
        ..Default::default()
    });
    tester.get_actors(&ActorFilter {
        nationality: Some("Française".to_string()),
        ..Default::default()
    });
    tester.get_actors(&ActorFilter {
        age_min: Some(45),
        age_max: Some(55),
        ..Default::default()
    });
}

fn movies_phase(tester: &mut ApiTester, state: &mut RunState) {
    let movie1 = model::sample_movie();
    state.movie1 = tester.create_movie(&movie1);
    state.movie2 = tester.create_movie(&model::sample_movie2());

    tester.get_movies(&MovieFilter::default());

    if let Some(id) = state.movie1.clone() {
        tester.get_movie_by_id(&id, Some(&movie1));
    }

    tester.get_movies(&MovieFilter {
        search: Some("Môme".to_string()),
        ..Default::default()
    });
    tester.get_movies(&MovieFilter {
        genre: Some("Biographie".to_string()),
        ..Default::default()
    });
    tester.get_movies(&MovieFilter {
        year: Some(2007),
        ..Default::default()
    });
}

fn search_phase(tester: &mut ApiTester) {
    for query in ["Marion", "Biographie", "2007"] {
        tester.global_search(query);
    }
    tester.get_genres();
    tester.get_nationalities();
}

fn suggestions_phase(tester: &mut ApiTester) {
    tester.daily_suggestions();
    tester.suggestions_consistency();
    tester.suggestions_current_state();
}

fn uploads_phase(tester: &mut ApiTester, state: &RunState, photo: &FilePart) {
    if let Some(id) = &state.actor1 {
        tester.upload_photo(EntityKind::Actor, id, photo.clone());
    }
    if let Some(id) = &state.movie1 {
        tester.upload_photo(EntityKind::Movie, id, photo.clone());
    }
}

fn cleanup_phase(tester: &mut ApiTester, state: &RunState) {
    if let Some(id) = &state.actor2 {
        tester.update_actor(id, &updated_actor());
    }
    if let Some(id) = &state.movie2 {
        tester.update_movie(id, &updated_movie());
    }

    let actors: Vec<String> = tester.created_actors.iter().map(|a| a.id.clone()).collect();
    let movies: Vec<String> = tester.created_movies.iter().map(|m| m.id.clone()).collect();
    for id in actors {
        tester.delete_entity(EntityKind::Actor, &id);
    }
    for id in movies {
        tester.delete_entity(EntityKind::Movie, &id);
    }
}

fn updated_actor() -> NewActor {
    let mut actor = model::sample_actor2();
    actor.age += 1;
    actor.biography = "Acteur français, Oscar du meilleur acteur pour The Artist".to_string();
    actor
}

fn updated_movie() -> NewMovie {
    let mut movie = model::sample_movie2();
    movie.description = "Film muet en noir et blanc, cinq Oscars".to_string();
    movie
}
