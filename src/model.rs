//! Actor and movie payloads
//!
//! The API uses French field names on the wire; the Rust fields are renamed.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /actors` and `PUT /actors/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewActor {
    #[serde(rename = "nom")]
    pub name: String,
    pub age: u32,
    #[serde(rename = "nationalite")]
    pub nationality: String,
    #[serde(rename = "biographie")]
    pub biography: String,
}

/// Body of `POST /movies` and `PUT /movies/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMovie {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "annee")]
    pub year: i32,
    pub genre: String,
    pub description: String,
}

/// An actor as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nom", default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(rename = "nationalite", default)]
    pub nationality: Option<String>,
    #[serde(rename = "biographie", default)]
    pub biography: Option<String>,
    #[serde(rename = "photo_profil", default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// A movie as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nom", default)]
    pub name: String,
    #[serde(rename = "annee", default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(
        rename = "photo_couverture",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo: Option<String>,
}

/// Ids arrive as strings or numbers; both are kept as strings
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

/// Which collection an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Actor,
    Movie,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Actor => "Actor",
            EntityKind::Movie => "Movie",
        }
    }

    /// Collection path segment, e.g. `actors`
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Actor => "actors",
            EntityKind::Movie => "movies",
        }
    }
}

pub fn sample_actor() -> NewActor {
    NewActor {
        name: "Marion Cotillard".to_string(),
        age: 48,
        nationality: "Française".to_string(),
        biography: "Actrice française primée aux Oscars".to_string(),
    }
}

pub fn sample_actor2() -> NewActor {
    NewActor {
        name: "Jean Dujardin".to_string(),
        age: 52,
        nationality: "Française".to_string(),
        biography: "Acteur français connu pour The Artist".to_string(),
    }
}

pub fn sample_movie() -> NewMovie {
    NewMovie {
        name: "La Môme".to_string(),
        year: 2007,
        genre: "Biographie".to_string(),
        description: "Film biographique sur Édith Piaf".to_string(),
    }
}

pub fn sample_movie2() -> NewMovie {
    NewMovie {
        name: "The Artist".to_string(),
        year: 2011,
        genre: "Drame".to_string(),
        description: "Film muet en noir et blanc".to_string(),
    }
}
