//! Evaluation pipeline: one strictly sequential pass per application.
//!
//! Built → Invoked → {Extracted | InvocationFailed} → Normalized → Resolved → Persisted
//!
//! There is no retry transition. `InvocationFailed` goes straight to a
//! persisted `Pending` row, so every run ends in exactly one stored evaluation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::applications::ApplicationSource;
use crate::errors::AppError;
use crate::evaluation::normalizer::{normalize, ReasonClassifier};
use crate::evaluation::prompts::build_prompt;
use crate::evaluation::resolver::resolve_and_persist;
use crate::evaluation::store::EvaluationStore;
use crate::llm_client::TextModel;
use crate::models::application::{ApplicationAggregate, Resume, Vacancy};
use crate::models::evaluation::EvaluationRow;

/// Validated input for one run. Only exists once both sides are present.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub application_id: i32,
    pub vacancy: Vacancy,
    pub resume: Resume,
}

impl EvaluationRequest {
    /// Fails fast when the vacancy or résumé is missing.
    pub fn prepare(aggregate: ApplicationAggregate) -> Result<Self, AppError> {
        let application_id = aggregate.application_id;

        let resume = aggregate.resume.ok_or_else(|| {
            AppError::MissingPrerequisite(format!(
                "Application {application_id} has no active resume attached"
            ))
        })?;
        let vacancy = aggregate.vacancy.ok_or_else(|| {
            AppError::MissingPrerequisite(format!(
                "Application {application_id} has no vacancy attached"
            ))
        })?;

        Ok(Self {
            application_id,
            vacancy,
            resume,
        })
    }
}

/// Everything a run needs. Holds no mutable state, so concurrent runs for
/// different applications share it freely.
#[derive(Clone)]
pub struct EvaluationPipeline {
    model: Arc<dyn TextModel>,
    store: Arc<dyn EvaluationStore>,
    model_id: String,
    classifier: ReasonClassifier,
}

impl EvaluationPipeline {
    pub fn new(
        model: Arc<dyn TextModel>,
        store: Arc<dyn EvaluationStore>,
        model_id: impl Into<String>,
        classifier: ReasonClassifier,
    ) -> Self {
        Self {
            model,
            store,
            model_id: model_id.into(),
            classifier,
        }
    }

    /// Loads the application aggregate and evaluates it.
    pub async fn evaluate_application(
        &self,
        source: &dyn ApplicationSource,
        application_id: i32,
    ) -> Result<EvaluationRow, AppError> {
        let aggregate = source.load(application_id).await?.ok_or_else(|| {
            AppError::MissingPrerequisite(format!("Application {application_id} not found"))
        })?;

        let request = EvaluationRequest::prepare(aggregate)?;
        self.evaluate(request).await
    }

    /// Runs one pass of the pipeline for a validated request.
    pub async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationRow, AppError> {
        let application_id = request.application_id;

        let prompt = build_prompt(&request.vacancy, &request.resume);
        debug!(
            "Built evaluation prompt for application {application_id} (vacancy {}, resume {}, {} chars)",
            request.vacancy.id,
            request.resume.id,
            prompt.len()
        );

        info!(
            "Invoking {} model {} for application {application_id}",
            self.model.backend(),
            self.model_id
        );
        let outcome = self
            .model
            .generate(&self.model_id, &prompt)
            .await
            .map(|raw| {
                if raw.trim().is_empty() {
                    debug!("Model returned empty content for application {application_id}");
                }
                normalize(&raw, &self.classifier)
            });

        resolve_and_persist(self.store.as_ref(), application_id, outcome).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::evaluation::store::MemoryEvaluationStore;
    use crate::llm_client::{GeminiClient, ModelInvocationError};
    use crate::models::application::WorkExperience;

    /// Returns a canned response, or fails with a 503 from the provider.
    pub struct StubModel {
        response: Result<String, String>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubModel {
        pub fn replying(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextModel for StubModel {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String, ModelInvocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response
                .clone()
                .map_err(|message| ModelInvocationError::Api {
                    status: 503,
                    message,
                })
        }

        fn backend(&self) -> &'static str {
            "stub"
        }
    }

    /// Fixed in-memory application aggregates.
    #[derive(Default)]
    pub struct StubSource {
        pub aggregates: Vec<ApplicationAggregate>,
    }

    #[async_trait]
    impl ApplicationSource for StubSource {
        async fn load(&self, application_id: i32) -> Result<Option<ApplicationAggregate>, AppError> {
            Ok(self
                .aggregates
                .iter()
                .find(|a| a.application_id == application_id)
                .cloned())
        }
    }

    pub fn complete_aggregate(application_id: i32) -> ApplicationAggregate {
        ApplicationAggregate {
            application_id,
            vacancy: Some(Vacancy {
                id: 2,
                title: "Go Developer".to_string(),
                description: "Build payment services".to_string(),
                requirements: "Go, Kubernetes".to_string(),
                location: "Remote".to_string(),
            }),
            resume: Some(Resume {
                id: 3,
                profile_summary: "Backend engineer".to_string(),
                academic_training: "Systems Engineering".to_string(),
                skills: "Go, PostgreSQL".to_string(),
                languages: "Spanish, English".to_string(),
                work_experience: vec![WorkExperience {
                    company_name: "Acme".to_string(),
                    position: "Developer".to_string(),
                    description: "APIs in Go".to_string(),
                    start_date: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
                    end_date: None,
                }],
            }),
        }
    }

    fn pipeline(model: Arc<StubModel>, store: Arc<MemoryEvaluationStore>) -> EvaluationPipeline {
        EvaluationPipeline::new(model, store, "test-model", ReasonClassifier::default())
    }

    #[test]
    fn test_prepare_requires_resume_and_vacancy() {
        let mut no_resume = complete_aggregate(1);
        no_resume.resume = None;
        assert!(matches!(
            EvaluationRequest::prepare(no_resume),
            Err(AppError::MissingPrerequisite(msg)) if msg.contains("resume")
        ));

        let mut no_vacancy = complete_aggregate(1);
        no_vacancy.vacancy = None;
        assert!(matches!(
            EvaluationRequest::prepare(no_vacancy),
            Err(AppError::MissingPrerequisite(msg)) if msg.contains("vacancy")
        ));

        assert!(EvaluationRequest::prepare(complete_aggregate(1)).is_ok());
    }

    #[tokio::test]
    async fn test_successful_run_persists_model_verdict() {
        let model = Arc::new(StubModel::replying(
            r#"{"result":"Passed","comments":"Good fit","strengths":["Go"],"weaknesses":[],"score":85}"#,
        ));
        let store = Arc::new(MemoryEvaluationStore::default());
        let source = StubSource {
            aggregates: vec![complete_aggregate(7)],
        };

        let row = pipeline(model.clone(), store.clone())
            .evaluate_application(&source, 7)
            .await
            .unwrap();

        assert_eq!(row.application_id, 7);
        assert_eq!(row.result, "Passed");
        assert_eq!(row.score, 85);
        assert_eq!(row.comments, "Good fit");
        assert_eq!(row.strengths, "Go");
        assert_eq!(row.weaknesses, "");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.rows(), vec![row]);

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("Title: Go Developer"));
        assert!(prompts[0].contains("- Developer at Acme (2020-02 - Present): APIs in Go"));
    }

    #[tokio::test]
    async fn test_model_failure_persists_pending_without_retry() {
        let model = Arc::new(StubModel::failing("model is overloaded"));
        let store = Arc::new(MemoryEvaluationStore::default());
        let source = StubSource {
            aggregates: vec![complete_aggregate(8)],
        };

        let row = pipeline(model.clone(), store.clone())
            .evaluate_application(&source, 8)
            .await
            .unwrap();

        assert_eq!(row.result, "Pending");
        assert_eq!(row.score, 0);
        assert_eq!(
            row.comments,
            "Error calling model: API error (status 503): model is overloaded"
        );
        assert_eq!(row.strengths, "");
        assert_eq!(row.weaknesses, "");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_model_host_persists_pending() {
        let uri = {
            let server = wiremock::MockServer::start().await;
            server.uri()
        };
        let model = Arc::new(GeminiClient::new("test-key".to_string(), uri));
        let store = Arc::new(MemoryEvaluationStore::default());
        let pipeline = EvaluationPipeline::new(
            model,
            store.clone(),
            "gemini-2.0-flash",
            ReasonClassifier::default(),
        );

        let row = pipeline
            .evaluate(EvaluationRequest::prepare(complete_aggregate(10)).unwrap())
            .await
            .unwrap();

        assert_eq!(row.result, "Pending");
        assert_eq!(row.score, 0);
        assert!(
            row.comments.starts_with("Error calling model: HTTP error: "),
            "comments: {}",
            row.comments
        );
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_model_response_is_pending_with_sentinel() {
        let model = Arc::new(StubModel::replying("   "));
        let store = Arc::new(MemoryEvaluationStore::default());

        let row = pipeline(model, store.clone())
            .evaluate(EvaluationRequest::prepare(complete_aggregate(9)).unwrap())
            .await
            .unwrap();

        assert_eq!(row.result, "Pending");
        assert_eq!(row.comments, "No comments provided by model.");
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_application_never_calls_model() {
        let model = Arc::new(StubModel::replying("{}"));
        let store = Arc::new(MemoryEvaluationStore::default());
        let mut missing_resume = complete_aggregate(5);
        missing_resume.resume = None;
        let source = StubSource {
            aggregates: vec![missing_resume],
        };
        let pipeline = pipeline(model.clone(), store.clone());

        let unknown = pipeline.evaluate_application(&source, 404).await;
        assert!(matches!(unknown, Err(AppError::MissingPrerequisite(_))));

        let incomplete = pipeline.evaluate_application(&source, 5).await;
        assert!(matches!(incomplete, Err(AppError::MissingPrerequisite(_))));

        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test]
    async fn test_total_persistence_across_success_and_failure() {
        let store = Arc::new(MemoryEvaluationStore::default());
        let ok = pipeline(Arc::new(StubModel::replying(r#"{"score": 40}"#)), store.clone());
        let failing = pipeline(Arc::new(StubModel::failing("timeout")), store.clone());
        let request = || EvaluationRequest::prepare(complete_aggregate(1)).unwrap();

        for run in 0..3 {
            ok.evaluate(request()).await.unwrap();
            failing.evaluate(request()).await.unwrap();
            assert_eq!(store.insert_count(), (run + 1) * 2);
        }

        let results: Vec<_> = store.rows().into_iter().map(|r| r.result).collect();
        assert_eq!(
            results,
            vec!["Failed", "Pending", "Failed", "Pending", "Failed", "Pending"]
        );
    }
}
