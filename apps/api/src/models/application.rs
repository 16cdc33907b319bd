use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A posted job vacancy. Read-only snapshot for evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct Vacancy {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
}

/// One entry of a résumé's work history. `end_date = None` means ongoing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperience {
    pub company_name: String,
    pub position: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resume {
    pub id: i32,
    pub profile_summary: String,
    pub academic_training: String,
    pub skills: String,
    pub languages: String,
    pub work_experience: Vec<WorkExperience>,
}

/// Everything the evaluation pipeline needs for one application, as loaded
/// by an `ApplicationSource`. Either side may be missing.
#[derive(Debug, Clone)]
pub struct ApplicationAggregate {
    pub application_id: i32,
    pub vacancy: Option<Vacancy>,
    pub resume: Option<Resume>,
}
