use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use overview_gap::config::AppConfig;
use overview_gap::gap::batch::ArticleAnalysis;
use overview_gap::gap::{BatchReport, GapReport, Outcome};
use overview_gap::logging;
use overview_gap::prose::{answer_question, recommendation_prose};
use overview_gap::sources::{load_articles, load_overview, save_json};

#[derive(Parser, Debug)]
#[clap(
    name = "overview-gap",
    version,
    about = "Compare articles against a Google AI Overview and report topic coverage gaps"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one article (plain text) or a batch of fetched articles (JSON)
    Analyze {
        /// AI Overview JSON written by the scraper
        #[clap(short, long)]
        overview: PathBuf,

        /// Article as a plain text file
        #[clap(short, long, conflicts_with = "articles")]
        article: Option<PathBuf>,

        /// Article fetcher records (JSON object or array)
        #[clap(short = 'A', long)]
        articles: Option<PathBuf>,

        /// Write the JSON result to this file
        #[clap(short = 'O', long)]
        output: Option<PathBuf>,

        /// Use the configured embedding service for semantic matching
        #[clap(short, long)]
        embeddings: bool,

        /// Ask the prose service for an editorial plan (single article only)
        #[clap(short, long)]
        prose: bool,

        /// Print JSON instead of tables
        #[clap(short, long)]
        json: bool,
    },

    /// Show the topics extracted from a plain text file
    Topics {
        file: PathBuf,

        #[clap(short, long)]
        json: bool,
    },

    /// Ask the prose service a question, optionally grounded on an AI Overview
    Chat {
        question: String,

        #[clap(short, long)]
        overview: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Analyze {
            overview,
            article,
            articles,
            output,
            embeddings,
            prose,
            json,
        } => {
            let overview = load_overview(&overview)?;

            match (article, articles) {
                (Some(path), None) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("cannot read article {}", path.display()))?;
                    let overview_text = overview.content().unwrap_or_default().to_string();

                    let outcome = config
                        .with_analyzer(embeddings, move |analyzer| {
                            let context = analyzer.context_from_overview(&overview);
                            analyzer.analyze(&context, &text)
                        })
                        .await?;

                    if json {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        print_outcome(&outcome, print_report);
                    }
                    if let Some(path) = &output {
                        save_json(&outcome, path)?;
                    }

                    if prose {
                        if let Outcome::Report(report) = &outcome {
                            let params = config.llm.params()?;
                            match recommendation_prose(&overview_text, report, &params).await {
                                Some(text) => println!("\n{}\n{}", "Piano editoriale".bold(), text),
                                None => warn!("Prose service unavailable; structured report only"),
                            }
                        }
                    }
                }
                (None, Some(path)) => {
                    let records = load_articles(&path)?;
                    info!("Analyzing {} article records", records.len());

                    let outcome = config
                        .with_analyzer(embeddings, move |analyzer| {
                            let context = analyzer.context_from_overview(&overview);
                            analyzer.analyze_articles(&context, &records)
                        })
                        .await?;

                    if json {
                        println!("{}", serde_json::to_string_pretty(&outcome)?);
                    } else {
                        print_outcome(&outcome, print_batch);
                    }
                    if let Some(path) = &output {
                        save_json(&outcome, path)?;
                    }
                }
                _ => bail!("pass exactly one of --article or --articles"),
            }
        }

        Command::Topics { file, json } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let topics = config.extractor().extract(&text);

            if json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else {
                let mut table = Table::new();
                table.add_row(Row::new(vec![
                    Cell::new("Argomento"),
                    Cell::new("Frequenza"),
                    Cell::new("Categoria"),
                    Cell::new("Priorità"),
                ]));
                for topic in &topics {
                    table.add_row(Row::new(vec![
                        Cell::new(topic.text()),
                        Cell::new(&topic.frequency().to_string()),
                        Cell::new(&topic.category().to_string()),
                        Cell::new(&topic.priority().to_string()),
                    ]));
                }
                table.printstd();
            }
        }

        Command::Chat { question, overview } => {
            let overview_text = match overview {
                Some(path) => load_overview(&path)?
                    .content()
                    .unwrap_or_default()
                    .to_string(),
                None => String::new(),
            };
            let params = config.llm.params()?;

            match answer_question(&question, &overview_text, None, &params).await {
                Some(response) => {
                    println!("{}", response.text);
                    if let Some(chart) = &response.chart {
                        println!("\n{}\n{}", "Grafico".bold(), serde_json::to_string_pretty(chart)?);
                    }
                    if let Some(table) = &response.table {
                        println!("\n{}\n{}", "Tabella".bold(), serde_json::to_string_pretty(table)?);
                    }
                }
                None => bail!("the prose service did not answer"),
            }
        }
    }

    Ok(())
}

fn print_outcome<T>(outcome: &Outcome<T>, print: fn(&T)) {
    match outcome {
        Outcome::Report(report) => print(report),
        Outcome::Error { error } => eprintln!("{} {}", "Errore:".red().bold(), error),
    }
}

fn coverage_label(coverage: f64) -> colored::ColoredString {
    let label = format!("{:.2}%", coverage);
    if coverage >= 70.0 {
        label.green()
    } else if coverage >= 50.0 {
        label.yellow()
    } else {
        label.red()
    }
}

fn print_report(report: &GapReport) {
    println!(
        "{} {} ({} argomenti, metodo {})",
        "Copertura:".bold(),
        coverage_label(report.coverage_percentage),
        report.total_ai_topics,
        report.analysis_method
    );
    println!(
        "{} {:.2}   {} {:.2}/100",
        "Copertura pesata:".bold(),
        report.weighted_coverage,
        "Qualità:".bold(),
        report.content_quality
    );

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Argomento"),
        Cell::new("Stato"),
        Cell::new("Tipo"),
        Cell::new("Confidenza"),
    ]));
    for m in &report.covered_topics {
        table.add_row(Row::new(vec![
            Cell::new(&m.topic),
            Cell::new("coperto"),
            Cell::new(&m.match_type.to_string()),
            Cell::new(&format!("{:.2}", m.confidence)),
        ]));
    }
    for m in &report.partially_covered {
        table.add_row(Row::new(vec![
            Cell::new(&m.topic),
            Cell::new("parziale"),
            Cell::new(&m.match_type.to_string()),
            Cell::new(&format!("{:.2}", m.confidence)),
        ]));
    }
    for t in &report.missing_topics {
        table.add_row(Row::new(vec![
            Cell::new(&t.topic),
            Cell::new("mancante"),
            Cell::new(&format!("{} / {}", t.category, t.priority)),
            Cell::new(
                &t.weak_match
                    .as_ref()
                    .map(|w| format!("{:.2}", w.confidence))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }
    table.printstd();

    if !report.recommendations.is_empty() {
        println!("\n{}", "Raccomandazioni".bold());
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("{}. [{}] {}", i + 1, rec.priority, rec.title.bold());
            println!("   {}", rec.description);
        }
    }
}

fn print_batch(batch: &BatchReport) {
    println!(
        "{} {}/{} articoli analizzati, copertura media {}",
        "Batch:".bold(),
        batch.successful_analyses,
        batch.total_articles,
        coverage_label(batch.summary.average_coverage_percentage)
    );

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("URL"),
        Cell::new("Copertura"),
        Cell::new("Qualità"),
        Cell::new("Mancanti"),
    ]));
    for analysis in &batch.articles_analysis {
        let row = match analysis {
            ArticleAnalysis::Analyzed(a) => vec![
                Cell::new(&a.url),
                Cell::new(&format!("{:.2}%", a.report.coverage_percentage)),
                Cell::new(&format!("{:.2}", a.report.content_quality)),
                Cell::new(&a.report.missing_topics.len().to_string()),
            ],
            ArticleAnalysis::Failed(f) => vec![
                Cell::new(&f.url),
                Cell::new("errore"),
                Cell::new(&f.error),
                Cell::new("-"),
            ],
        };
        table.add_row(Row::new(row));
    }
    table.printstd();

    if !batch.summary.most_common_missing_topics.is_empty() {
        println!("\n{}", "Argomenti mancanti più frequenti".bold());
        for missing in &batch.summary.most_common_missing_topics {
            println!("- {} ({})", missing.topic, missing.count);
        }
    }
}
