#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::gap::{
        AnalysisContext, AnalysisMethod, GapAnalyzer, GapConfig, GapReport, MatchType,
    };
    use crate::similarity::{EmbedError, Embedder};
    use crate::topic::TopicCategory;

    fn analyzer() -> GapAnalyzer {
        GapAnalyzer::new(GapConfig::default())
    }

    fn report(analyzer: &GapAnalyzer, topics: &[&str], article: &str) -> GapReport {
        let context = AnalysisContext::from_topics("", topics);
        analyzer
            .analyze(&context, article)
            .report()
            .cloned()
            .expect("analysis should produce a report")
    }

    /// Fixed vectors per text; anything unknown is orthogonal to the first axis
    struct ScriptedEmbedder {
        vectors: HashMap<&'static str, Vec<f32>>,
        hosted: bool,
    }

    impl ScriptedEmbedder {
        fn new(hosted: bool) -> Self {
            let mut vectors = HashMap::new();
            vectors.insert("dati", vec![1.0, 0.0]);
            vectors.insert("finanza", vec![1.0, 0.0]);
            vectors.insert("numeri", vec![0.5, 0.866_025_4]);
            Self { vectors, hosted }
        }
    }

    impl Embedder for ScriptedEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| vec![0.0, 1.0]))
        }

        fn is_hosted(&self) -> bool {
            self.hosted
        }
    }

    /// Answers `healthy_calls` requests, then fails every request
    struct FlakyEmbedder {
        healthy_calls: usize,
        calls: AtomicUsize,
    }

    impl Embedder for FlakyEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.healthy_calls {
                Ok(vec![0.3, 0.4])
            } else {
                Err(EmbedError::Transport("connection refused".to_string()))
            }
        }
    }

    #[test]
    fn test_buckets_partition_reference_topics() {
        let analyzer = analyzer();
        let topics = [
            "machine learning",
            "etica",
            "algoritmo",
            "dati",
            "definizione",
            "applicazioni pratiche",
        ];
        let articles = [
            "Il machine learning usa algoritmi. Gli algoritmi elaborano informazioni.",
            "Un testo che non parla di niente in particolare.",
            "Definizione, etica, dati e machine learning.",
        ];

        for article in articles {
            let report = report(&analyzer, &topics, article);
            assert_eq!(report.total_ai_topics, topics.len());
            assert_eq!(
                report.covered_topics.len()
                    + report.partially_covered.len()
                    + report.missing_topics.len(),
                topics.len()
            );

            let mut seen: Vec<&str> = report
                .covered_topics
                .iter()
                .chain(report.partially_covered.iter())
                .map(|m| m.topic.as_str())
                .chain(report.missing_topics.iter().map(|t| t.topic.as_str()))
                .collect();
            seen.sort();
            let mut expected = topics.to_vec();
            expected.sort();
            assert_eq!(seen, expected, "{}", article);
        }
    }

    #[test]
    fn test_coverage_grows_as_topics_are_inserted() {
        let analyzer = analyzer();
        let topics = ["machine learning", "etica", "finanza", "robotica", "sanità"];
        let mut article = String::from("Un testo introduttivo.");
        let mut previous = report(&analyzer, &topics, &article).coverage_percentage;

        for topic in topics {
            article.push_str(&format!(" Si parla di {}.", topic));
            let coverage = report(&analyzer, &topics, &article).coverage_percentage;
            assert!(coverage >= previous, "{} < {} after '{}'", coverage, previous, topic);
            previous = coverage;
        }
        assert_eq!(previous, 100.0);
    }

    #[test]
    fn test_machine_learning_and_ethics_example() {
        let report = report(
            &analyzer(),
            &["machine learning", "etica"],
            "Il machine learning è una tecnologia.",
        );

        assert_eq!(report.covered_topics.len(), 1);
        let covered = &report.covered_topics[0];
        assert_eq!(covered.topic, "machine learning");
        assert_eq!(covered.match_type, MatchType::Exact);
        assert_eq!(covered.confidence, 1.0);

        assert_eq!(report.missing_topics.len(), 1);
        assert_eq!(report.missing_topics[0].topic, "etica");
        assert_eq!(report.missing_topics[0].category, TopicCategory::Ethical);
        assert_eq!(report.coverage_percentage, 50.0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["missing_topics"][0]["category"], "etico");
        assert_eq!(value["covered_topics"][0]["match_type"], "exact");
        assert_eq!(value["analysis_method"], "basic");
    }

    #[test]
    fn test_empty_reference_yields_only_the_error() {
        let analyzer = analyzer();
        let empty: [&str; 0] = [];
        for context in [
            AnalysisContext::empty(),
            AnalysisContext::from_topics("   ", &empty),
            analyzer.context_from_text(""),
        ] {
            let outcome = analyzer.analyze(&context, "Il machine learning è una tecnologia.");
            assert_eq!(
                serde_json::to_string(&outcome).unwrap(),
                r#"{"error":"AI Overview non caricato"}"#
            );
        }
    }

    #[test]
    fn test_synonym_gives_fixed_partial_confidence() {
        let report = report(
            &analyzer(),
            &["machine learning"],
            "L'apprendimento automatico è una disciplina moderna.",
        );
        assert!(report.covered_topics.is_empty());
        assert_eq!(report.partially_covered.len(), 1);
        let partial = &report.partially_covered[0];
        assert_eq!(partial.match_type, MatchType::Synonym);
        assert_eq!(partial.confidence, 0.7);
        assert_eq!(report.coverage_percentage, 0.0);
        assert_eq!(report.weighted_coverage, 0.42);
    }

    #[test]
    fn test_recommendations_are_capped() {
        let topics: Vec<String> = (0..50)
            .map(|i| match i % 3 {
                0 => format!("definizione {}", i),
                1 => format!("applicazioni {}", i),
                _ => format!("costi {}", i),
            })
            .collect();
        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        let report = report(&analyzer(), &topic_refs, "Nessun argomento rilevante.");

        assert_eq!(report.missing_topics.len(), 50);
        assert!(report.recommendations.len() <= 6);
        let ranks: Vec<u8> = report
            .recommendations
            .iter()
            .map(|r| r.priority.rank())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_deterministic_runs_are_identical() {
        let overview = "Il machine learning e il deep learning trasformano la sanità. \
                        Le applicazioni del machine learning crescono; le sfide restano. \
                        La definizione di intelligenza artificiale cambia.";
        let article = "Gli algoritmi di apprendimento automatico servono alla finanza. \
                       Ad esempio, gli algoritmi riducono i costi.\n\n\
                       In conclusione, la robotica e la finanza cambiano.";

        let run = || {
            let analyzer = analyzer();
            let context = analyzer.context_from_text(overview);
            serde_json::to_string(&analyzer.analyze(&context, article)).unwrap()
        };
        let first = run();
        assert_eq!(first, run());

        let analyzer = analyzer();
        let context = analyzer.context_from_text(overview);
        let again = serde_json::to_string(&analyzer.analyze(&context, article)).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_embedding_path_weak_and_synonym() {
        let analyzer = analyzer().with_embedder(Box::new(ScriptedEmbedder::new(false)));
        let article = "I numeri contano. I numeri e il dataset.";
        let report = report(&analyzer, &["dati", "finanza"], article);

        assert_eq!(report.analysis_method, AnalysisMethod::SemanticApi);
        assert!(!analyzer.is_degraded());

        // Weak semantic match plus synonym: the synonym path wins
        assert_eq!(report.partially_covered.len(), 1);
        assert_eq!(report.partially_covered[0].topic, "dati");
        assert_eq!(report.partially_covered[0].match_type, MatchType::Synonym);

        // Weak semantic match alone stays missing with the match recorded
        assert_eq!(report.missing_topics.len(), 1);
        let weak = report.missing_topics[0].weak_match.as_ref().unwrap();
        assert_eq!(weak.match_type, MatchType::SemanticLow);
        assert_eq!(weak.matched.as_deref(), Some("numeri"));
        assert!(weak.confidence > 0.4 && weak.confidence <= 0.6);
    }

    #[test]
    fn test_hosted_embeddings_reported_as_external_service() {
        let analyzer = analyzer().with_embedder(Box::new(ScriptedEmbedder::new(true)));
        let report = report(&analyzer, &["dati"], "I numeri contano. I numeri e il dataset.");
        assert_eq!(report.analysis_method, AnalysisMethod::ExternalService);
    }

    #[test]
    fn test_embedding_failure_falls_back_without_mixing() {
        let topics = ["machine learning", "algoritmo", "etica", "dati"];
        let article = "Gli algoritmi elaborano informazioni. Gli algoritmi imparano.\n\n\
                       Questo paragrafo parla di modelli statistici e di molte altre cose.";
        let baseline = report(&analyzer(), &topics, article);

        for healthy_calls in [0, 3] {
            let analyzer = analyzer().with_embedder(Box::new(FlakyEmbedder {
                healthy_calls,
                calls: AtomicUsize::new(0),
            }));
            let degraded = report(&analyzer, &topics, article);
            assert_eq!(degraded.analysis_method, AnalysisMethod::Basic);
            assert!(analyzer.is_degraded());
            assert_eq!(
                serde_json::to_string(&degraded).unwrap(),
                serde_json::to_string(&baseline).unwrap()
            );

            // Later runs stay on the deterministic path
            let again = report(&analyzer, &topics, article);
            assert_eq!(again, baseline);
        }
    }
}
