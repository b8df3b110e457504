//! Submission of queued categories for facet generation.
//!
//! Order of operations for [`Orchestrator::generate`]:
//!
//! 1. validate (client, queue, prompts) with no side effects
//! 2. look for an equivalent completed job unless forced
//! 3. insert the job as `processing`
//! 4. call the generator
//! 5. store ranked facets and mark the job `completed`, or mark it `failed`

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use super::client::FacetGenerator;
use super::error::GenerationError;
use super::fingerprint::{find_duplicate, fingerprint};
use super::job::{GenerationJob, JobStatus};
use super::payload::{ContextCategory, GenerateRequest, PromptPayload};
use crate::catalog::Category;
use crate::config::Config;
use crate::context::ClientContext;
use crate::db::{category_repo, facet_repo, job_repo, prompt_repo, Database, DatabaseError};
use crate::error::ValidationError;
use crate::facets::{normalize_all, rank, RecommendedFacet};
use crate::prompts::{check_required, sort_for_execution, ResolvedPrompt};
use crate::queue::SelectionQueue;

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub dedup_lookback: u32,
    pub required_prompts: Vec<String>,
    pub execution_order: Vec<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            dedup_lookback: config.dedup.lookback,
            required_prompts: config.prompts.required.clone(),
            execution_order: config.prompts.execution_order.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Return an equivalent completed job instead of generating.
    #[default]
    Check,
    /// Always create and run a new job, even for a known fingerprint.
    ForceNew,
}

/// What to generate besides the queued categories.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub prompt_ids: Vec<String>,
    /// Hierarchy depth the user navigated to. Category context is cut to
    /// this many segments; 0 sends full paths.
    pub context_depth: usize,
    pub name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// An equivalent job already completed. Nothing was created.
    Duplicate { job: GenerationJob },
    Completed {
        job: GenerationJob,
        facets: Vec<RecommendedFacet>,
    },
}

/// Everything validation established about a submission.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub client_id: String,
    pub category_ids: Vec<String>,
    /// Prompts in execution order.
    pub prompts: Vec<ResolvedPrompt>,
}

impl ValidatedSubmission {
    pub fn prompt_ids(&self) -> Vec<String> {
        self.prompts.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.category_ids, &self.prompt_ids())
    }
}

pub struct Orchestrator {
    db: Database,
    generator: Arc<dyn FacetGenerator>,
    settings: GenerationSettings,
}

impl Orchestrator {
    pub fn new(db: Database, generator: Arc<dyn FacetGenerator>, settings: GenerationSettings) -> Self {
        Self {
            db,
            generator,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Checks a submission without touching the network or writing rows.
    pub fn validate(
        &self,
        ctx: &ClientContext,
        queue: &SelectionQueue,
        prompt_ids: &[String],
    ) -> Result<ValidatedSubmission, GenerationError> {
        let client_id = ctx.active_client()?.to_string();
        if queue.is_empty() {
            return Err(ValidationError::EmptyQueue.into());
        }

        let mut prompts = Vec::with_capacity(prompt_ids.len());
        let mut seen = HashSet::new();
        for id in prompt_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match prompt_repo::resolve(&self.db, &client_id, id) {
                Ok(p) => prompts.push(p),
                Err(DatabaseError::NotFound { .. }) => {
                    return Err(ValidationError::UnknownPrompt(id.clone()).into())
                }
                Err(e) => return Err(e.into()),
            }
        }

        let names: Vec<&str> = prompts.iter().map(|p| p.name()).collect();
        check_required(&names, &self.settings.required_prompts)?;
        sort_for_execution(&mut prompts, &self.settings.execution_order, |p| p.name());

        Ok(ValidatedSubmission {
            client_id,
            category_ids: queue.ids(),
            prompts,
        })
    }

    /// Most recent completed job, within the lookback window, with the given
    /// fingerprint.
    pub fn find_duplicate(
        &self,
        client_id: &str,
        fp: &str,
    ) -> Result<Option<GenerationJob>, GenerationError> {
        let recent = job_repo::recent_completed(&self.db, client_id, self.settings.dedup_lookback)?;
        Ok(find_duplicate(&recent, fp).cloned())
    }

    /// Validates, deduplicates and runs a generation for the queued
    /// categories. The queue is cleared only when the job completes.
    pub async fn generate(
        &self,
        ctx: &ClientContext,
        queue: &mut SelectionQueue,
        request: GenerationRequest,
        policy: DedupPolicy,
    ) -> Result<GenerationOutcome, GenerationError> {
        let submission = self.validate(ctx, queue, &request.prompt_ids)?;

        if policy == DedupPolicy::Check {
            if let Some(job) = self.find_duplicate(&submission.client_id, &submission.fingerprint())? {
                info!(job_id = %job.id, "Equivalent completed job found");
                return Ok(GenerationOutcome::Duplicate { job });
            }
        }

        let mut job = GenerationJob::new(
            submission.client_id.clone(),
            ctx.user_id.clone(),
            submission.category_ids.clone(),
            submission.prompt_ids(),
            JobStatus::Processing,
        );
        if let Some(name) = request.name {
            job = job.with_name(name);
        }
        if let Some(metadata) = request.metadata {
            job = job.with_metadata(metadata);
        }
        job_repo::insert(&self.db, &job)?;

        let span = info_span!("generate", job_id = %job.id, categories = job.total_categories);
        let facets = self
            .run(&job, &submission, request.context_depth)
            .instrument(span)
            .await;

        let facets = match facets {
            Ok(facets) => facets,
            Err(e) => return Err(self.fail(&job.id, e)),
        };

        queue.clear();
        let job = job_repo::find_by_id(&self.db, &job.id)?.ok_or_else(|| {
            GenerationError::JobNotFound {
                job_id: job.id.clone(),
            }
        })?;
        Ok(GenerationOutcome::Completed { job, facets })
    }

    async fn run(
        &self,
        job: &GenerationJob,
        submission: &ValidatedSubmission,
        depth: usize,
    ) -> Result<Vec<RecommendedFacet>, GenerationError> {
        let context = self.context_categories(&submission.client_id, &submission.category_ids, depth)?;
        let request = GenerateRequest {
            job_id: job.id.clone(),
            category_ids: submission.category_ids.clone(),
            prompts: submission
                .prompts
                .iter()
                .map(|p| PromptPayload::new(p, context.clone()))
                .collect(),
        };

        let response = self.generator.generate(&request).await?;
        if response.facets_generated == 0 {
            return Err(GenerationError::NoFacets {
                job_id: job.id.clone(),
            });
        }

        let default_category = match submission.category_ids.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        };
        let drafts = normalize_all(&response.facets, default_category);
        if !drafts.is_empty() {
            facet_repo::insert_all(&self.db, &rank(&job.id, drafts))?;
        }

        // A reported count with no usable rows still leaves the job empty.
        let facets = facet_repo::list_for_job(&self.db, &job.id)?;
        if facets.is_empty() {
            return Err(GenerationError::NoFacets {
                job_id: job.id.clone(),
            });
        }
        job_repo::mark_completed(&self.db, &job.id, job.total_categories)?;
        info!(
            reported = response.facets_generated,
            stored = facets.len(),
            "Generation completed"
        );
        Ok(facets)
    }

    fn context_categories(
        &self,
        client_id: &str,
        category_ids: &[String],
        depth: usize,
    ) -> Result<Vec<ContextCategory>, GenerationError> {
        let wanted: HashSet<&str> = category_ids.iter().map(String::as_str).collect();
        let categories: Vec<Category> = category_repo::list_for_client(&self.db, client_id)?
            .into_iter()
            .filter(|c| wanted.contains(c.id.as_str()))
            .collect();
        if categories.len() < wanted.len() {
            warn!(
                missing = wanted.len() - categories.len(),
                "Queued categories not found for client; sent without context"
            );
        }
        Ok(categories
            .iter()
            .map(|c| ContextCategory::project(c, depth))
            .collect())
    }

    /// Marks the job failed and hands the original error back.
    fn fail(&self, job_id: &str, error: GenerationError) -> GenerationError {
        if error.fails_job() {
            if let Err(e) = job_repo::mark_failed(&self.db, job_id, &error.to_string()) {
                warn!(job_id, "Could not mark job failed: {}", e);
            }
        }
        error
    }

    /// Loads a stored job and its facets in rank order.
    pub fn load_existing(
        &self,
        ctx: &ClientContext,
        job_id: &str,
    ) -> Result<(GenerationJob, Vec<RecommendedFacet>), GenerationError> {
        let client_id = ctx.active_client()?;
        let job = job_repo::find_by_id(&self.db, job_id)?
            .filter(|j| j.client_id == client_id)
            .ok_or_else(|| GenerationError::JobNotFound {
                job_id: job_id.to_string(),
            })?;
        let facets = facet_repo::list_for_job(&self.db, job_id)?;
        Ok((job, facets))
    }

    /// Creates an empty `pending` project that is not submitted.
    pub fn create_placeholder(
        &self,
        ctx: &ClientContext,
        name: &str,
    ) -> Result<GenerationJob, GenerationError> {
        let client_id = ctx.active_client()?;
        let job = GenerationJob::new(client_id, ctx.user_id.clone(), Vec::new(), Vec::new(), JobStatus::Pending)
            .with_name(name);
        job_repo::insert(&self.db, &job)?;
        Ok(job)
    }
}
