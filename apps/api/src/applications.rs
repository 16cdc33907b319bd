//! Read-only loader for the application aggregate (vacancy + active résumé
//! with work experience). The tables are owned by the wider HR system.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use crate::errors::AppError;
use crate::models::application::{ApplicationAggregate, Resume, Vacancy, WorkExperience};

#[async_trait]
pub trait ApplicationSource: Send + Sync {
    /// `Ok(None)` when the application itself does not exist.
    async fn load(&self, application_id: i32) -> Result<Option<ApplicationAggregate>, AppError>;
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: i32,
    resume_id: i32,
    vacant_id: i32,
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: i32,
    profile_summary: Option<String>,
    academic_training: Option<String>,
    skills: Option<String>,
    languages: Option<String>,
}

#[derive(Clone)]
pub struct PgApplicationSource {
    pool: PgPool,
}

impl PgApplicationSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_vacancy(&self, vacancy_id: i32) -> Result<Option<Vacancy>, AppError> {
        let vacancy = sqlx::query_as::<_, Vacancy>(
            r#"
            SELECT id,
                   COALESCE(title, '') AS title,
                   COALESCE(description, '') AS description,
                   COALESCE(requirements, '') AS requirements,
                   COALESCE(location, '') AS location
            FROM vacancies
            WHERE id = $1
            "#,
        )
        .bind(vacancy_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vacancy)
    }

    /// Inactive (soft-deleted) résumés are treated as absent.
    async fn load_resume(&self, resume_id: i32) -> Result<Option<Resume>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, profile_summary, academic_training, skills, languages
            FROM resumes
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let work_experience = sqlx::query_as::<_, WorkExperience>(
            r#"
            SELECT COALESCE(company_name, '') AS company_name,
                   COALESCE(position, '') AS position,
                   COALESCE(description, '') AS description,
                   start_date,
                   end_date
            FROM work_experiences
            WHERE resume_id = $1
            ORDER BY start_date, id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Resume {
            id: row.id,
            profile_summary: row.profile_summary.unwrap_or_default(),
            academic_training: row.academic_training.unwrap_or_default(),
            skills: row.skills.unwrap_or_default(),
            languages: row.languages.unwrap_or_default(),
            work_experience,
        }))
    }
}

#[async_trait]
impl ApplicationSource for PgApplicationSource {
    async fn load(&self, application_id: i32) -> Result<Option<ApplicationAggregate>, AppError> {
        let application = sqlx::query_as::<_, ApplicationRow>(
            "SELECT id, resume_id, vacant_id FROM applications WHERE id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(application) = application else {
            return Ok(None);
        };

        let vacancy = self.load_vacancy(application.vacant_id).await?;
        let resume = self.load_resume(application.resume_id).await?;
        debug!(
            "Loaded application {}: vacancy={}, resume={}",
            application.id,
            vacancy.is_some(),
            resume.is_some()
        );

        Ok(Some(ApplicationAggregate {
            application_id: application.id,
            vacancy,
            resume,
        }))
    }
}
