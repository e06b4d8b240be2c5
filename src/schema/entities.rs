//! Typed shapes of the recruiting entities
//!
//! Fields are optional unless every payload observed carries them. Unknown
//! fields are ignored; a mismatch means a known field has the wrong type.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Free-form object (localised names, vendor-specific blocks)
pub type Dict = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub href: Option<String>,
    pub rel: Option<String>,
}

/// Reference to another entity by id only
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecruitingProcess {
    pub id: Option<String>,
    pub step_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonName {
    pub first: Option<String>,
    pub last: Option<String>,
    pub former: Option<String>,
    pub middle: Option<String>,
    pub prefix: Option<Dict>,
    pub suffix: Option<Dict>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    pub id: Option<String>,
    pub is_internal: Option<bool>,
    pub is_active: Option<bool>,
    pub employment_status: Option<String>,
    pub name: Option<PersonName>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MonthYear {
    pub month: Option<i64>,
    pub year: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkExperience {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<MonthYear>,
    pub to: Option<MonthYear>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Skill {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub skill: Option<Dict>,
    pub proficiency_level: Option<Dict>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Degree {
    pub id: Option<String>,
    pub name: Option<Dict>,
    pub href: Option<String>,
    pub rel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct School {
    pub id: Option<String>,
    pub name: Option<Dict>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A major or minor
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldOfStudy {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Education {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    pub degree: Option<Degree>,
    pub school: Option<School>,
    pub major: Option<FieldOfStudy>,
    pub minor: Option<FieldOfStudy>,
    pub from: Option<MonthYear>,
    pub to: Option<MonthYear>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct License {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Motivation {
    pub id: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeReferral {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<Dict>,
    pub potential_score: Option<i64>,
    pub creation_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreeningQuestionResponse {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub question: Option<Question>,
    pub response: Option<String>,
    pub responses: Option<Vec<String>>,
    pub is_correct: Option<bool>,
    pub is_disqualifying: Option<bool>,
    pub actual_score: Option<i64>,
    pub recruiter_declined_to_answer: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Origin {
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApplicantSource {
    pub id: Option<String>,
    pub name: Option<Dict>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub links: Vec<Link>,
    pub external_apply_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime::deserialize")]
    pub updated_at: Option<DateTime<Utc>>,
    pub creator: Option<IdRef>,
    pub recruiting_process: Option<RecruitingProcess>,
    #[serde(default, deserialize_with = "flexible_datetime::deserialize")]
    pub available_start_date: Option<DateTime<Utc>>,
    pub candidate: Option<Candidate>,
    pub work_experiences: Option<Vec<WorkExperience>>,
    pub is_processed: Option<bool>,
    pub educations: Option<Vec<Education>>,
    pub job_posting: Option<IdRef>,
    pub skills: Option<Vec<Skill>>,
    pub position: Option<IdRef>,
    pub availability: Option<Dict>,
    pub hire_details: Option<Dict>,
    pub employee_referral: Option<EmployeeReferral>,
    pub country_question_responses: Option<Vec<Dict>>,
    pub job_board: Option<IdRef>,
    #[serde(default, deserialize_with = "flexible_datetime::deserialize")]
    pub applied_date: Option<DateTime<Utc>>,
    pub origin: Option<Origin>,
    pub motivations: Option<Vec<Motivation>>,
    pub opportunity: Option<IdRef>,
    pub applicant_source: Option<ApplicantSource>,
    pub licenses: Option<Vec<License>>,
    pub likes: Option<Vec<String>>,
    pub behaviors: Option<Vec<String>>,
    pub screening_question_responses: Option<Vec<ScreeningQuestionResponse>>,
    pub creation_method: Option<String>,
}

/// Date-times arrive both with and without an offset; naive values are UTC
pub(crate) mod flexible_datetime {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date-time '{}'", raw))),
        }
    }
}
