//! Advisory shape validation for known entity payloads
//!
//! Raw JSON is always persisted as fetched. Validation only tells the
//! operator that a payload no longer looks like the entity it claims to be.

mod entities;

pub use entities::{
    ApplicantSource, Application, Candidate, Degree, Dict, Education, EmployeeReferral,
    FieldOfStudy, IdRef, License, Link, MonthYear, Motivation, Origin, PersonName, Question,
    RecruitingProcess, School, ScreeningQuestionResponse, Skill, WorkExperience,
};

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Entities with a known shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Application,
    Candidate,
    WorkExperience,
    Education,
    Skill,
    License,
    Motivation,
}

impl EntityKind {
    /// Maps a relation name to the entity it points at
    ///
    /// Matching ignores case, `_`, `-`, spaces and a plural `s`.
    ///
    /// ```
    /// use talent_harvest::schema::EntityKind;
    ///
    /// assert_eq!(EntityKind::for_rel("Candidate"), Some(EntityKind::Candidate));
    /// assert_eq!(EntityKind::for_rel("work_experiences"), Some(EntityKind::WorkExperience));
    /// assert_eq!(EntityKind::for_rel("Download"), None);
    /// ```
    pub fn for_rel(rel: &str) -> Option<Self> {
        let key: String = rel
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.strip_suffix('s').unwrap_or(key.as_str());

        match key {
            "application" => Some(Self::Application),
            "candidate" => Some(Self::Candidate),
            "workexperience" => Some(Self::WorkExperience),
            "education" => Some(Self::Education),
            "skill" => Some(Self::Skill),
            "license" => Some(Self::License),
            "motivation" => Some(Self::Motivation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Candidate => "candidate",
            Self::WorkExperience => "work_experience",
            Self::Education => "education",
            Self::Skill => "skill",
            Self::License => "license",
            Self::Motivation => "motivation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated entity
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Application(Box<Application>),
    Candidate(Candidate),
    WorkExperience(WorkExperience),
    Education(Education),
    Skill(Skill),
    License(License),
    Motivation(Motivation),
}

/// A payload did not have the structure of the entity it was expected to be
#[derive(Debug, Error)]
#[error("{entity} payload does not match expected shape: {reason}")]
pub struct ShapeMismatch {
    pub entity: EntityKind,
    pub reason: String,
}

/// Validates `value` as an entity of `kind`
pub fn validate(kind: EntityKind, value: &Value) -> Result<Entity, ShapeMismatch> {
    let mismatch = |e: serde_json::Error| ShapeMismatch {
        entity: kind,
        reason: e.to_string(),
    };

    let entity = match kind {
        EntityKind::Application => {
            Entity::Application(Box::new(Application::deserialize(value).map_err(mismatch)?))
        }
        EntityKind::Candidate => Entity::Candidate(Candidate::deserialize(value).map_err(mismatch)?),
        EntityKind::WorkExperience => {
            Entity::WorkExperience(WorkExperience::deserialize(value).map_err(mismatch)?)
        }
        EntityKind::Education => Entity::Education(Education::deserialize(value).map_err(mismatch)?),
        EntityKind::Skill => Entity::Skill(Skill::deserialize(value).map_err(mismatch)?),
        EntityKind::License => Entity::License(License::deserialize(value).map_err(mismatch)?),
        EntityKind::Motivation => {
            Entity::Motivation(Motivation::deserialize(value).map_err(mismatch)?)
        }
    };

    Ok(entity)
}
