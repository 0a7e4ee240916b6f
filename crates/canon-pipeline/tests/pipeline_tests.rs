//! Integration tests for canon-pipeline
//!
//! Full runs against the in-memory narrative store, plus hand-written stores
//! that stall or count concurrent calls.

use canon_domain::{
    CharacterFact, Claim, ClaimFlag, ClaimId, ClaimKind, NarrativeMemory, Passage, Polarity, Span, TemporalOrder,
    TimelineFact, Verdict,
};
use canon_extractor::ExtractorError;
use canon_memory::InMemoryNarrative;
use canon_pipeline::{Pipeline, PipelineConfig, PipelineError};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const NOVEL: &str = "Anna kept bees behind the mill.\n\n\
Anna fled the city at night, carrying nothing.\n\n\
Years later the great fire destroyed the granaries.\n\n\
Anna sold the farm to Pierre.";

fn novel() -> InMemoryNarrative {
    InMemoryNarrative::from_text(NOVEL)
        .with_event("Anna", "Anna fled the city", 1820, Span::new(33, 79))
        .with_world_event("the great fire", 1825, Span::new(81, 132))
}

fn pipeline(memory: InMemoryNarrative) -> Pipeline<InMemoryNarrative> {
    Pipeline::new(Arc::new(memory), PipelineConfig::default()).unwrap()
}

#[tokio::test]
async fn test_flight_after_fire_is_contradicted() {
    let pipeline = pipeline(novel());
    let dossier = pipeline
        .verify("case-fire", "Anna fled the city after the fire.")
        .await
        .unwrap();

    assert_eq!(dossier.claims().len(), 2);
    let fire = &dossier.claims()[0];
    let fled = &dossier.claims()[1];

    assert_eq!(fire.text, "the fire");
    assert_eq!(fire.verdict, Verdict::Supported);
    assert_eq!(fled.kind, ClaimKind::Temporal(TemporalOrder::After));
    assert_eq!(fled.references, vec![fire.claim_id]);
    assert_eq!(fled.verdict, Verdict::Contradicted);
    assert_eq!(fled.score, 1.0);

    assert_eq!(dossier.verdict(), Verdict::Contradicted);
    assert!(dossier.rationale().contains("claim 1"));
}

#[tokio::test]
async fn test_flight_before_fire_is_supported() {
    let pipeline = pipeline(novel());
    let dossier = pipeline
        .verify("case-fire", "Anna fled the city before the fire.")
        .await
        .unwrap();

    assert_eq!(dossier.claims()[1].verdict, Verdict::Supported);
    assert_eq!(dossier.verdict(), Verdict::Supported);
}

#[tokio::test]
async fn test_sentence_stated_in_novel_is_supported() {
    let pipeline = pipeline(novel());
    let dossier = pipeline
        .verify("case-night", "Anna fled the city at night.")
        .await
        .unwrap();

    let record = &dossier.claims()[0];
    assert_eq!(record.verdict, Verdict::Supported);
    let citation = record
        .citations
        .iter()
        .find(|c| c.excerpt == "Anna fled the city at night, carrying nothing.")
        .unwrap();
    assert_eq!(citation.polarity, Polarity::Supports);
    assert!(record.citations.iter().all(|c| c.polarity != Polarity::Contradicts));
    assert_eq!(dossier.verdict(), Verdict::Supported);
}

#[tokio::test]
async fn test_anachronism_contradicts_document() {
    let pipeline = pipeline(novel());
    let dossier = pipeline
        .verify("case-car", "Anna kept bees behind the mill. Anna bought a car for the farm.")
        .await
        .unwrap();

    let bees = &dossier.claims()[0];
    assert_eq!(bees.verdict, Verdict::Supported);
    assert!(bees.flags.is_empty());

    let car = &dossier.claims()[1];
    assert_eq!(car.verdict, Verdict::Contradicted);
    assert_eq!(car.flags, vec![ClaimFlag::Anachronism]);
    let cited = car
        .citations
        .iter()
        .find(|c| c.polarity == Polarity::Contradicts)
        .unwrap();
    assert_eq!(cited.excerpt, "the great fire");
    assert_eq!(cited.span, Span::new(81, 132));

    assert_eq!(dossier.verdict(), Verdict::Contradicted);
}

#[tokio::test]
async fn test_anachronism_rule_can_be_disabled() {
    let mut config = PipelineConfig::default();
    config.checker.world.enabled = false;
    let pipeline = Pipeline::new(Arc::new(novel()), config).unwrap();

    let dossier = pipeline
        .verify("case-car", "Anna bought a car for the farm.")
        .await
        .unwrap();
    assert!(dossier.claims()[0].flags.is_empty());
    assert_ne!(dossier.claims()[0].verdict, Verdict::Contradicted);
}

#[tokio::test]
async fn test_no_entities_is_an_extraction_error() {
    let pipeline = pipeline(novel());
    let result = pipeline.verify("case-x", "the rain fell all night long.").await;
    assert!(matches!(
        result,
        Err(PipelineError::Extraction(ExtractorError::NoEntities))
    ));

    let result = pipeline.verify("case-x", "   ").await;
    assert!(matches!(
        result,
        Err(PipelineError::Extraction(ExtractorError::EmptyInput))
    ));
}

#[tokio::test]
async fn test_mutual_causal_references_are_unverifiable() {
    let pipeline = pipeline(novel());
    let a = Claim::new(
        ClaimId::derive("case-cycle", 0),
        0,
        Span::new(0, 18),
        "Anna sold the farm",
        ["Anna".to_string()],
        ClaimKind::Causal,
    )
    .with_reference(ClaimId::derive("case-cycle", 1));
    let b = Claim::new(
        ClaimId::derive("case-cycle", 1),
        1,
        Span::new(20, 40),
        "Anna kept bees",
        ["Anna".to_string()],
        ClaimKind::Causal,
    )
    .with_reference(ClaimId::derive("case-cycle", 0));

    let dossier = pipeline.verify_claims("case-cycle", vec![a, b]).await.unwrap();

    for record in dossier.claims() {
        assert_eq!(record.verdict, Verdict::Unverifiable);
        assert!(record.flags.contains(&ClaimFlag::DependencyCycle));
        assert!(record.score <= 0.3);
    }
    assert_eq!(dossier.verdict(), Verdict::Unverifiable);
}

#[tokio::test]
async fn test_identical_runs_are_byte_identical() {
    let backstory = "Anna kept bees behind the mill. Anna fled the city after the fire.";

    let first = pipeline(novel()).verify("case-7", backstory).await.unwrap();
    let second = pipeline(novel()).verify("case-7", backstory).await.unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[tokio::test]
async fn test_causal_claim_capped_by_unsupported_cause() {
    let pipeline = pipeline(novel());
    let dossier = pipeline
        .verify("case-cause", "Anna sold the farm because her husband died.")
        .await
        .unwrap();

    let cause = &dossier.claims()[0];
    let effect = &dossier.claims()[1];
    assert_eq!(cause.text, "her husband died");
    assert_eq!(cause.verdict, Verdict::Unverifiable);

    assert_eq!(effect.kind, ClaimKind::Causal);
    assert_eq!(effect.verdict, Verdict::Unverifiable);
    assert!(effect.flags.contains(&ClaimFlag::DependencyCapped));
    assert!(effect.score <= 0.3);
}

#[tokio::test]
async fn test_backend_failure_degrades_one_claim() {
    let pipeline = pipeline(novel().with_failure("husband"));
    let dossier = pipeline
        .verify("case-fail", "Anna kept bees behind the mill. Anna mourned her husband for many years.")
        .await
        .unwrap();

    let first = &dossier.claims()[0];
    assert_eq!(first.verdict, Verdict::Supported);
    assert!(first.flags.is_empty());

    let degraded = &dossier.claims()[1];
    assert_eq!(degraded.flags, vec![ClaimFlag::RetrievalFailed]);
    assert_eq!(degraded.verdict, Verdict::Unverifiable);
    assert!(degraded.citations.is_empty());
}

/// Memory whose every call blocks for a fixed delay
struct SlowMemory {
    delay: Duration,
}

impl NarrativeMemory for SlowMemory {
    type Error = String;

    fn retrieve_passages(&self, _: &str, _: &[String], _: usize) -> Result<Vec<Passage>, String> {
        std::thread::sleep(self.delay);
        Ok(Vec::new())
    }

    fn lookup_event_time(&self, _: &str, _: &str) -> Result<Option<TimelineFact>, String> {
        std::thread::sleep(self.delay);
        Ok(None)
    }

    fn lookup_character_fact(&self, _: &str, _: &str) -> Result<Option<CharacterFact>, String> {
        std::thread::sleep(self.delay);
        Ok(None)
    }

    fn knows_entity(&self, _: &str) -> Result<bool, String> {
        std::thread::sleep(self.delay);
        Ok(false)
    }
}

#[tokio::test]
async fn test_timeout_downgrades_claims() {
    let mut config = PipelineConfig::default();
    config.retriever.lookup_timeout_ms = 50;
    let memory = SlowMemory {
        delay: Duration::from_millis(300),
    };
    let pipeline = Pipeline::new(Arc::new(memory), config).unwrap();

    let dossier = pipeline
        .verify("case-slow", "Anna kept bees behind the mill.")
        .await
        .unwrap();

    let record = &dossier.claims()[0];
    assert_eq!(record.flags, vec![ClaimFlag::RetrievalTimeout]);
    assert_eq!(record.verdict, Verdict::Unverifiable);
    assert!(record.citations.is_empty());
    assert_eq!(dossier.verdict(), Verdict::Unverifiable);
}

#[tokio::test]
async fn test_cancellation_emits_no_dossier() {
    let memory = SlowMemory {
        delay: Duration::from_millis(500),
    };
    let pipeline = Pipeline::new(Arc::new(memory), PipelineConfig::default()).unwrap();

    let started = Instant::now();
    let result = pipeline
        .verify_with_cancel(
            "case-cancel",
            "Anna kept bees behind the mill. Anna fled the city after the fire.",
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert!(started.elapsed() < Duration::from_millis(400));
}

/// Memory that records the peak number of calls in flight
struct CountingMemory {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingMemory {
    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NarrativeMemory for CountingMemory {
    type Error = String;

    fn retrieve_passages(&self, _: &str, _: &[String], _: usize) -> Result<Vec<Passage>, String> {
        self.enter();
        Ok(Vec::new())
    }

    fn lookup_event_time(&self, _: &str, _: &str) -> Result<Option<TimelineFact>, String> {
        self.enter();
        Ok(None)
    }

    fn lookup_character_fact(&self, _: &str, _: &str) -> Result<Option<CharacterFact>, String> {
        self.enter();
        Ok(None)
    }

    fn knows_entity(&self, _: &str) -> Result<bool, String> {
        self.enter();
        Ok(false)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_retrievals_bounded_by_worker_pool() {
    let mut config = PipelineConfig::default();
    config.pipeline.max_concurrent_retrievals = 1;
    let memory = Arc::new(CountingMemory {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let pipeline = Pipeline::new(Arc::clone(&memory), config).unwrap();

    let backstory = "Anna kept bees behind the mill. Pierre bought the farm in spring. \
                     Marie sang at the wedding feast. Louis repaired the old bridge.";
    let dossier = pipeline.verify("case-bound", backstory).await.unwrap();

    assert_eq!(dossier.claims().len(), 4);
    // one claim at a time: its passage query, entity query and entity check
    assert!(memory.peak.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn test_config_file_drives_pipeline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[retriever]\ntop_k = 1\n\n[aggregator]\nsignificance_threshold = 0.95").unwrap();
    let config = PipelineConfig::from_file(file.path()).unwrap();

    let pipeline = Pipeline::new(Arc::new(novel()), config).unwrap();
    assert_eq!(pipeline.config().retriever.top_k, 1);

    let dossier = pipeline
        .verify("case-file", "Anna kept bees behind the mill.")
        .await
        .unwrap();
    assert!(dossier.claims().iter().all(|c| c.citations.len() <= 1));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = PipelineConfig::default();
    config.pipeline.max_concurrent_retrievals = 0;
    assert!(matches!(
        Pipeline::new(Arc::new(novel()), config),
        Err(PipelineError::Config(_))
    ));
}

#[tokio::test]
async fn test_prediction_record() {
    let dossier = pipeline(novel())
        .verify("case-9", "Anna fled the city after the fire.")
        .await
        .unwrap();
    let prediction = dossier.prediction();

    assert_eq!(prediction.id, "case-9");
    assert_eq!(prediction.prediction, Verdict::Contradicted);
    let json = serde_json::to_string(&prediction).unwrap();
    assert!(json.contains("\"CONTRADICTED\""));
}
