use anyhow::{Context, Result};
use overview_gap::config::AppConfig;
use overview_gap::gap::classifier::{Candidate, GapClassifier};
use overview_gap::gap::{Classification, Match};
use overview_gap::similarity::{HttpEmbedder, SimilarityStrategy};
use prettytable::{Cell, Row, Table};
use std::env;
use std::fs;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Command line utility to see how each reference topic is matched against an article.
///
/// Usage:
///    cargo run --bin compare_topics -- REFERENCE.txt ARTICLE.txt [--embeddings]
///
/// For every topic extracted from the reference text this prints the best
/// candidate, its score and the bucket the classifier puts it in. With
/// `--embeddings` the configured embedding service is used and any failure is
/// reported instead of falling back.
fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    let use_embeddings = args.iter().any(|a| a == "--embeddings");
    let files: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();
    if files.len() != 2 {
        eprintln!("Usage: {} REFERENCE.txt ARTICLE.txt [--embeddings]", args[0]);
        std::process::exit(1);
    }

    let reference = fs::read_to_string(files[0])
        .with_context(|| format!("cannot read {}", files[0]))?;
    let article =
        fs::read_to_string(files[1]).with_context(|| format!("cannot read {}", files[1]))?;

    let config = AppConfig::from_env()?;
    let extractor = config.extractor();
    let reference_topics = extractor.extract(&reference);
    let candidate = Candidate::new(&article, &extractor, config.gap.min_paragraph_chars);
    info!(
        "{} reference topics, {} candidate topics, {} paragraphs",
        reference_topics.len(),
        candidate.topics().len(),
        candidate.paragraphs().len()
    );

    let embedder = match (&config.embedding, use_embeddings) {
        (Some(embedding), true) => Some(HttpEmbedder::new(embedding.clone())?),
        (None, true) => anyhow::bail!("--embeddings needs EMBEDDING_PROVIDER"),
        _ => None,
    };
    let strategy = match &embedder {
        Some(embedder) => SimilarityStrategy::embedding(embedder),
        None => SimilarityStrategy::Deterministic,
    };
    let classifier = GapClassifier::new(&config.gap);

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Topic"),
        Cell::new("Bucket"),
        Cell::new("Match"),
        Cell::new("Score"),
        Cell::new("Matched"),
    ]));

    for topic in &reference_topics {
        let row = match classifier.classify(topic, &candidate, &strategy)? {
            Classification::Covered(m) => match_row(topic.text(), "covered", &m),
            Classification::Partial(m) => match_row(topic.text(), "partial", &m),
            Classification::Missing(t) => {
                let (score, matched) = t
                    .weak_match
                    .as_ref()
                    .map(|w| (format!("{:.3}", w.confidence), w.matched.clone().unwrap_or_default()))
                    .unwrap_or_else(|| ("-".to_string(), String::new()));
                vec![
                    Cell::new(topic.text()),
                    Cell::new("missing"),
                    Cell::new(&format!("{} / {}", t.category, t.priority)),
                    Cell::new(&score),
                    Cell::new(&matched),
                ]
            }
        };
        table.add_row(Row::new(row));
    }
    table.printstd();

    Ok(())
}

fn match_row(topic: &str, bucket: &str, m: &Match) -> Vec<Cell> {
    vec![
        Cell::new(topic),
        Cell::new(bucket),
        Cell::new(&m.match_type.to_string()),
        Cell::new(&format!("{:.3}", m.confidence)),
        Cell::new(m.matched.as_deref().unwrap_or("")),
    ]
}
