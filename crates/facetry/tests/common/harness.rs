//! Test harness for isolated workflow tests.
//!
//! Each `TestHarness` owns a temp directory holding a file-backed database,
//! a client context and whatever catalog and prompts the test seeded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use facetry::config::Config;
use facetry::db::{category_repo, prompt_repo};
use facetry::prompts::DEFAULT_EXECUTION_ORDER;
use facetry::{
    import_file, Category, ClientContext, Database, FacetGenerator, GenerationSettings,
    ImportReport, Orchestrator, PromptTemplate, Role,
};

pub const CLIENT_ID: &str = "client-1";
pub const USER_ID: &str = "user-1";

pub struct TestHarness {
    temp_dir: TempDir,
    pub db: Database,
    pub ctx: ClientContext,
    pub config: Config,
    prompts: HashMap<String, String>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open(&temp_dir.path().join("facetry.db")).expect("Failed to open database");
        Self {
            temp_dir,
            db,
            ctx: ClientContext::new(USER_ID, Role::Member, Some(CLIENT_ID.to_string())),
            config,
            prompts: HashMap::new(),
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a breadcrumb CSV and imports it for the harness client.
    pub fn import_csv(&self, content: &str) -> ImportReport {
        let path = self.temp_dir.path().join("categories.csv");
        std::fs::write(&path, content).expect("Failed to write import file");
        import_file(&self.db, CLIENT_ID, &path).expect("Import failed")
    }

    /// Imports one category per breadcrumb.
    pub fn import_paths(&self, paths: &[&str]) -> ImportReport {
        let mut csv = String::from("breadcrumbs\n");
        for p in paths {
            csv.push_str(&format!("\"{}\"\n", p));
        }
        self.import_csv(&csv)
    }

    pub fn categories(&self) -> Vec<Category> {
        category_repo::list_for_client(&self.db, CLIENT_ID).expect("Failed to list categories")
    }

    pub fn category_id(&self, path: &str) -> String {
        self.categories()
            .into_iter()
            .find(|c| c.category_path == path)
            .map(|c| c.id)
            .unwrap_or_else(|| panic!("no category at '{}'", path))
    }

    /// Creates the standard prompt templates.
    pub fn seed_prompts(&mut self) {
        for name in DEFAULT_EXECUTION_ORDER {
            let template = PromptTemplate::new(*name, format!("{} template", name));
            prompt_repo::insert(&self.db, &template).expect("Failed to insert prompt");
            self.prompts.insert(name.to_string(), template.id);
        }
    }

    pub fn prompt_id(&self, name: &str) -> String {
        self.prompts
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("prompt '{}' not seeded", name))
    }

    pub fn prompt_ids(&self, names: &[&str]) -> Vec<String> {
        names.iter().map(|n| self.prompt_id(n)).collect()
    }

    pub fn orchestrator(&self, generator: Arc<dyn FacetGenerator>) -> Orchestrator {
        Orchestrator::new(
            self.db.clone(),
            generator,
            GenerationSettings::from(&self.config),
        )
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}
