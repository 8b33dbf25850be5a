// prompts.rs

use crate::gap::GapReport;
use crate::prose::VisualRequest;
use crate::util::truncate_chars;

// Reference and article text passed to the prose service are cut to this size
const MAX_CONTEXT_CHARS: usize = 4000;

fn topic_list<'a>(topics: impl Iterator<Item = &'a str>) -> String {
    let list: Vec<&str> = topics.collect();
    if list.is_empty() {
        "nessuno".to_string()
    } else {
        list.join(", ")
    }
}

/// Editorial prose for a finished report. The structured report stays the
/// source of truth; the model only rewords it.
pub fn recommendations_prompt(overview_text: &str, report: &GapReport) -> String {
    let covered = topic_list(report.covered_topics.iter().map(|m| m.topic.as_str()));
    let partial = topic_list(report.partially_covered.iter().map(|m| m.topic.as_str()));
    let missing = topic_list(report.missing_topics.iter().map(|t| t.topic.as_str()));
    let recommendations: Vec<String> = report
        .recommendations
        .iter()
        .map(|r| format!("- [{}] {}: {}", r.priority, r.title, r.description))
        .collect();

    format!(
        "Sei un esperto SEO e content strategist. Confronta un articolo con l'AI Overview di Google.

## AI OVERVIEW:
{}

## RISULTATI DELL'ANALISI:
- Copertura: {}% ({} argomenti su {})
- Qualità del contenuto: {}/100
- Argomenti coperti: {}
- Argomenti coperti in parte: {}
- Argomenti mancanti: {}

## RACCOMANDAZIONI GIÀ INDIVIDUATE:
{}

Scrivi un piano di intervento in italiano, con titoli chiari e azioni concrete, che spieghi come
colmare i gap elencati. Non inventare argomenti che non compaiono nei risultati.",
        truncate_chars(overview_text, MAX_CONTEXT_CHARS),
        report.coverage_percentage,
        report.covered_topics.len(),
        report.total_ai_topics,
        report.content_quality,
        covered,
        partial,
        missing,
        recommendations.join("\n")
    )
}

/// Chat answer grounded on the loaded AI Overview and, optionally, a report
pub fn chat_prompt(
    question: &str,
    overview_text: &str,
    report: Option<&GapReport>,
    visual: VisualRequest,
) -> String {
    let mut context = String::new();
    if !overview_text.trim().is_empty() {
        context.push_str(&format!(
            "\n\n### AI Overview:\n{}",
            truncate_chars(overview_text, MAX_CONTEXT_CHARS)
        ));
    }
    if let Some(report) = report {
        context.push_str(&format!(
            "\n\n### Ultima analisi:\n- Copertura: {}%\n- Argomenti mancanti: {}",
            report.coverage_percentage,
            topic_list(report.missing_topics.iter().map(|t| t.topic.as_str()))
        ));
    }
    if context.is_empty() {
        context.push_str("\nNessun contesto disponibile.");
    }

    let mut prompt = format!(
        "Sei un esperto SEO e content strategist. Fornisci analisi precise e concrete.

## CONTESTO DISPONIBILE:{}

## DOMANDA DELL'UTENTE:
{}

## ISTRUZIONI:
- Rispondi sempre in italiano, con titoli e sottotitoli chiari
- Basa le raccomandazioni sui dati del contesto fornito
- Se mancano informazioni, specifica cosa serve per un'analisi più precisa",
        context, question
    );

    match visual {
        VisualRequest::Chart => prompt.push_str(
            "

L'utente ha richiesto un grafico. Dopo la risposta testuale aggiungi, su una riga a parte,
un blocco JSON nel formato:
{\"chart\": {\"type\": \"bar\", \"title\": \"Titolo\", \"data\": {\"x\": [\"A\", \"B\"], \"y\": [1, 2]}}}
Usa al massimo 8 elementi.",
        ),
        VisualRequest::Table => prompt.push_str(
            "

L'utente ha richiesto una tabella. Dopo la risposta testuale aggiungi, su una riga a parte,
un blocco JSON nel formato:
{\"table\": {\"title\": \"Titolo\", \"headers\": [\"Colonna1\", \"Colonna2\"], \"rows\": [[\"a\", \"b\"]]}}",
        ),
        VisualRequest::None => {}
    }

    prompt
}
