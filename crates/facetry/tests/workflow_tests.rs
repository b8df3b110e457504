//! End-to-end workflow: import, navigate, queue, generate, export.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FacetRowBuilder, FixedGenerator, TestHarness};
use facetry::db::{export_repo, facet_repo, job_repo, queue_repo};
use facetry::export::export_selected_with;
use facetry::generation::{DedupPolicy, GenerationOutcome, GenerationRequest};
use facetry::navigator::level_options;
use facetry::prompts::{INDUSTRY_ANALYSIS, MASTER_PROMPT};
use facetry::{
    update, Cmd, GenerationError, JobStatus, Msg, NavigatorState, Priority, QueuePersister,
    QueueStore, ResultView, SampleFacetGenerator, SelectionQueue, UpdateSettings,
    ValidationError,
};

const CATALOG: &[&str] = &[
    "Marine > Safety > Life Jackets",
    "Marine > Safety > Flares",
    "Marine > Safety > Life Jackets > Kids",
    "Marine > Electronics > GPS",
    "Garden > Tools",
];

fn select(level: usize, value: &str) -> Msg {
    Msg::SelectLevel {
        level,
        value: value.to_string(),
    }
}

fn request(h: &TestHarness, prompts: &[&str]) -> GenerationRequest {
    GenerationRequest {
        prompt_ids: h.prompt_ids(prompts),
        ..Default::default()
    }
}

#[test]
fn test_import_breadcrumb_scenario() {
    let h = TestHarness::new();
    let report = h.import_csv("industry,breadcrumbs\nMarine,\"Marine > Safety > Life Jackets\"\n");
    assert_eq!(report.inserted, 1);

    let cats = h.categories();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0].level, 3);
    assert_eq!(cats[0].name, "Life Jackets");
    assert_eq!(cats[0].category_path, "Marine > Safety > Life Jackets");
}

#[test]
fn test_navigation_drives_queue() {
    let h = TestHarness::new();
    h.import_paths(CATALOG);
    let cats = h.categories();
    let settings = UpdateSettings::default();

    let state = NavigatorState::new();
    assert!(level_options(&cats, &state, 2).is_empty());
    assert_eq!(level_options(&cats, &state, 1), vec!["Garden", "Marine"]);

    let (state, _) = update(state, select(1, "Marine"), &cats, &settings);
    let (state, _) = update(state, select(2, "Safety"), &cats, &settings);
    assert_eq!(level_options(&cats, &state, 3), vec!["Flares", "Life Jackets"]);

    let (state, cmd) = update(state, select(3, "Life Jackets"), &cats, &settings);
    assert!(matches!(cmd, Cmd::ScheduleAutoReset { .. }));

    let (_, cmd) = update(state, Msg::AddSelectionToQueue, &cats, &settings);
    let mut queue = SelectionQueue::new();
    match cmd {
        Cmd::Enqueue(id) => assert!(queue.toggle(&id)),
        other => panic!("expected an exact match, got {:?}", other),
    }
    assert!(queue.contains(&h.category_id("Marine > Safety > Life Jackets")));

    // Level 2 alone has no category of its own; everything below is offered.
    let state = NavigatorState::new();
    let (state, _) = update(state, select(1, "Marine"), &cats, &settings);
    let (state, _) = update(state, select(2, "Safety"), &cats, &settings);
    let (_, cmd) = update(state, Msg::AddSelectionToQueue, &cats, &settings);
    match cmd {
        Cmd::ConfirmBulkAdd { path, ids } => {
            assert_eq!(path, "Marine > Safety");
            assert_eq!(ids.len(), 3);
            assert_eq!(queue.add_all(ids), 2);
        }
        other => panic!("expected a bulk add, got {:?}", other),
    }
    assert_eq!(queue.len(), 3);
}

#[test]
fn test_hidden_categories_leave_options() {
    let h = TestHarness::new();
    h.import_paths(CATALOG);
    let garden = h.category_id("Garden > Tools");
    facetry::db::category_repo::set_visibility(&h.db, common::harness::CLIENT_ID, &garden, false).unwrap();

    let options = level_options(&h.categories(), &NavigatorState::new(), 1);
    assert_eq!(options, vec!["Marine"]);
}

#[tokio::test(start_paused = true)]
async fn test_queue_survives_sessions() {
    let h = TestHarness::new();
    h.import_paths(CATALOG);
    let flares = h.category_id("Marine > Safety > Flares");
    let gps = h.category_id("Marine > Electronics > GPS");

    let store: Arc<dyn QueueStore> = Arc::new(h.db.clone());
    let persister = QueuePersister::new(store.clone(), "user-1", Duration::from_millis(500));
    let mut queue = persister.restore().await.unwrap();
    queue.toggle(&flares);
    persister.queue_changed(&queue);
    queue.toggle(&gps);
    persister.queue_changed(&queue);
    tokio::time::sleep(Duration::from_millis(600)).await;
    persister.flush().await.unwrap();
    drop(persister);

    let mut stored = queue_repo::load(&h.db, "user-1").unwrap();
    stored.sort();
    let mut expected = vec![flares.clone(), gps.clone()];
    expected.sort();
    assert_eq!(stored, expected);

    let next = QueuePersister::new(store, "user-1", Duration::from_millis(500));
    let restored = next.restore().await.unwrap();
    assert_eq!(restored, queue);
}

#[tokio::test]
async fn test_required_prompt_scenario() {
    let mut h = TestHarness::new();
    h.import_paths(CATALOG);
    h.seed_prompts();
    let orch = h.orchestrator(Arc::new(SampleFacetGenerator));

    let ids: Vec<String> = h.categories().iter().take(3).map(|c| c.id.clone()).collect();
    let queue: SelectionQueue = ids.iter().cloned().collect();

    let neither = h.prompt_ids(&["Category Analysis", "Customer Insights"]);
    let err = orch.validate(&h.ctx, &queue, &neither).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Validation(ValidationError::MissingRequiredPrompt { .. })
    ));

    for alone in [INDUSTRY_ANALYSIS, MASTER_PROMPT] {
        let mut queue = queue.clone();
        let outcome = orch
            .generate(&h.ctx, &mut queue, request(&h, &[alone]), DedupPolicy::ForceNew)
            .await
            .unwrap();
        assert!(matches!(outcome, GenerationOutcome::Completed { .. }));
        assert!(queue.is_empty());
    }
}

#[tokio::test]
async fn test_zero_facets_marks_job_failed() {
    let mut h = TestHarness::new();
    h.import_paths(CATALOG);
    h.seed_prompts();
    let generator = Arc::new(FixedGenerator::new(vec![]).reporting(0));
    let orch = h.orchestrator(generator.clone());

    let mut queue: SelectionQueue = [h.category_id("Garden > Tools")].into_iter().collect();
    let err = orch
        .generate(&h.ctx, &mut queue, request(&h, &[MASTER_PROMPT]), DedupPolicy::Check)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::NoFacets { .. }));
    assert_eq!(generator.calls(), 1);

    let jobs = job_repo::list_for_client(&h.db, common::harness::CLIENT_ID, 5).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert_eq!(facet_repo::count_for_job(&h.db, &jobs[0].id).unwrap(), 0);
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn test_generate_dedup_and_export() {
    let mut h = TestHarness::new();
    h.import_paths(CATALOG);
    h.seed_prompts();
    let jackets = h.category_id("Marine > Safety > Life Jackets");
    let flares = h.category_id("Marine > Safety > Flares");

    let rows = vec![
        FacetRowBuilder::new(&jackets, "Size").priority("High").confidence(7).filling(80.0).build(),
        FacetRowBuilder::new(&jackets, "Buoyancy")
            .priority("High")
            .confidence(9)
            .values("50N, 100N, 150N")
            .build(),
        FacetRowBuilder::new(&flares, "Colour")
            .raw("F. Priority", serde_json::json!("low"))
            .values("Red, \"Signal\" Orange")
            .build(),
        FacetRowBuilder::new(&flares, "Burn Time").confidence(9).filling(60.0).build(),
    ];
    let generator = Arc::new(FixedGenerator::new(rows));
    let orch = h.orchestrator(generator.clone());
    let prompts = [INDUSTRY_ANALYSIS, "Competitor Analysis", MASTER_PROMPT];

    let mut queue: SelectionQueue = [jackets.clone(), flares.clone()].into_iter().collect();
    let mut req = request(&h, &prompts);
    req.context_depth = 2;
    let GenerationOutcome::Completed { job, facets } = orch
        .generate(&h.ctx, &mut queue, req, DedupPolicy::Check)
        .await
        .unwrap()
    else {
        panic!("expected completion");
    };

    let ranked: Vec<(&str, Priority, u32)> = facets
        .iter()
        .map(|f| (f.facet_name.as_str(), f.priority, f.sort_order))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Buoyancy", Priority::High, 1),
            ("Size", Priority::High, 2),
            ("Burn Time", Priority::Medium, 3),
            ("Colour", Priority::Low, 4),
        ]
    );
    {
        let seen = generator.requests.lock().unwrap();
        let ctx = &seen[0].prompts[0].context_categories;
        assert!(ctx.iter().all(|c| c.category_path == "Marine > Safety"));
    }

    // Same categories and prompts in a different order: the stored job is found.
    let mut again: SelectionQueue = [flares.clone(), jackets.clone()].into_iter().collect();
    let outcome = orch
        .generate(&h.ctx, &mut again, request(&h, &[MASTER_PROMPT, "Competitor Analysis", INDUSTRY_ANALYSIS]), DedupPolicy::Check)
        .await
        .unwrap();
    assert_eq!(outcome, GenerationOutcome::Duplicate { job: job.clone() });
    assert_eq!(generator.calls(), 1);

    let (loaded, loaded_facets) = orch.load_existing(&h.ctx, &job.id).unwrap();
    let mut view = ResultView::new(loaded_facets);
    assert_eq!(view.active_tab(), Some(jackets.as_str()));
    view.set_tab_selected(&flares, true);
    assert!(!view.all_selected());

    let artifact =
        export_selected_with(&h.db, &h.ctx, &loaded, &view, &h.categories(), &h.config.export.columns)
            .unwrap();
    let path = artifact.write_to(h.temp_path()).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(&reader.headers().unwrap()[2], "C. Filter Attributes");
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "Marine > Safety > Flares");
    assert_eq!(&records[0][2], "Burn Time");
    assert_eq!(&records[1][3], "Red, \"Signal\" Orange");
    assert_eq!(&records[1][5], "Low");

    let history = export_repo::list_for_job(&h.db, &job.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category_ids, vec![flares]);
}
