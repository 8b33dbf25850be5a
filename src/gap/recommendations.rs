use std::collections::HashSet;
use tracing::debug;

use super::config::GapConfig;
use super::types::{Buckets, Recommendation, RecommendationKind};
use super::TARGET_GAP;
use crate::topic::lexicon::category_advice;
use crate::topic::{TopicCategory, TopicPriority};

/// Fewer indicators than this trigger a structural recommendation
pub const MIN_INDICATORS: usize = 2;

// Categories with at least this many missing topics get their own advice
const MIN_CATEGORY_GAPS: usize = 2;

/// Rule-based recommendation list for a classified article
pub struct RecommendationBuilder<'a> {
    config: &'a GapConfig,
}

impl<'a> RecommendationBuilder<'a> {
    pub fn new(config: &'a GapConfig) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        buckets: &Buckets,
        depth_count: usize,
        structure_count: usize,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if let Some(rec) = self.critical(buckets) {
            recommendations.push(rec);
        }
        if let Some(rec) = self.deepen(buckets) {
            recommendations.push(rec);
        }
        if structure_count < MIN_INDICATORS {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Structural,
                priority: TopicPriority::Low,
                title: "Migliora la struttura del contenuto".to_string(),
                description: "Organizza il testo con un'introduzione, sezioni chiare e una \
                              conclusione, usando connettivi come \"inoltre\" e \"infine\"."
                    .to_string(),
                impact: "Rende il contenuto più leggibile e più facile da citare".to_string(),
                topics: Vec::new(),
            });
        }
        if depth_count < MIN_INDICATORS {
            recommendations.push(Recommendation {
                kind: RecommendationKind::Structural,
                priority: TopicPriority::Low,
                title: "Aumenta la profondità dell'analisi".to_string(),
                description: "Aggiungi esempi concreti, dati, statistiche e riferimenti a \
                              ricerche o casi di studio."
                    .to_string(),
                impact: "Aumenta l'autorevolezza percepita del contenuto".to_string(),
                topics: Vec::new(),
            });
        }
        recommendations.extend(self.by_category(buckets));
        recommendations.extend(self.general(buckets));

        if !recommendations
            .iter()
            .any(|r| r.priority == TopicPriority::High)
        {
            recommendations.insert(0, well_structured());
        }

        let mut seen = HashSet::new();
        recommendations.retain(|r| seen.insert(r.title.clone()));
        // Stable: insertion order is kept within a tier
        recommendations.sort_by_key(|r| r.priority.rank());
        recommendations.truncate(self.config.max_recommendations);

        debug!(
            target: TARGET_GAP,
            "Built {} recommendations", recommendations.len()
        );
        recommendations
    }

    fn critical(&self, buckets: &Buckets) -> Option<Recommendation> {
        let topics: Vec<String> = buckets
            .missing
            .iter()
            .filter(|t| t.priority == TopicPriority::High)
            .take(self.config.max_critical_topics)
            .map(|t| t.topic.clone())
            .collect();
        if topics.is_empty() {
            return None;
        }

        let list = topics.join(", ");
        Some(Recommendation {
            kind: RecommendationKind::Critical,
            priority: TopicPriority::High,
            title: format!("Aggiungi gli argomenti fondamentali: {}", list),
            description: format!(
                "L'AI Overview tratta {} come concetti di base, ma l'articolo non li copre. \
                 Aggiungi definizioni e spiegazioni dedicate.",
                list
            ),
            impact: "Colma le lacune più importanti rispetto all'AI Overview".to_string(),
            topics,
        })
    }

    /// Partial coverage and weak semantic matches
    fn deepen(&self, buckets: &Buckets) -> Option<Recommendation> {
        let topics: Vec<String> = buckets
            .partial
            .iter()
            .map(|m| m.topic.clone())
            .chain(
                buckets
                    .missing
                    .iter()
                    .filter(|t| t.weak_match.is_some())
                    .map(|t| t.topic.clone()),
            )
            .collect();
        if topics.is_empty() {
            return None;
        }

        Some(Recommendation {
            kind: RecommendationKind::Deepen,
            priority: TopicPriority::Medium,
            title: "Approfondisci gli argomenti trattati solo in parte".to_string(),
            description: format!(
                "L'articolo accenna a {} senza approfondire: sviluppa questi punti con \
                 spiegazioni più complete.",
                topics.join(", ")
            ),
            impact: "Trasforma le coperture parziali in coperture complete".to_string(),
            topics,
        })
    }

    /// One recommendation per category with several missing topics, in the
    /// order categories first appear among the missing topics
    fn by_category(&self, buckets: &Buckets) -> Vec<Recommendation> {
        let mut order: Vec<TopicCategory> = Vec::new();
        for topic in &buckets.missing {
            if !order.contains(&topic.category) {
                order.push(topic.category);
            }
        }

        order
            .into_iter()
            .filter_map(|category| {
                let topics: Vec<String> = buckets
                    .missing
                    .iter()
                    .filter(|t| t.category == category)
                    .map(|t| t.topic.clone())
                    .collect();
                if topics.len() < MIN_CATEGORY_GAPS {
                    return None;
                }
                Some(Recommendation {
                    kind: RecommendationKind::Category,
                    priority: TopicPriority::Medium,
                    title: format!("Copri gli aspetti di tipo {}", category),
                    description: category_advice(category).to_string(),
                    impact: format!("{} argomenti {} mancanti", topics.len(), category),
                    topics,
                })
            })
            .collect()
    }

    fn general(&self, buckets: &Buckets) -> Vec<Recommendation> {
        buckets
            .missing
            .iter()
            .filter(|t| t.priority != TopicPriority::High)
            .take(self.config.max_general_recommendations)
            .map(|t| Recommendation {
                kind: RecommendationKind::General,
                priority: TopicPriority::Medium,
                title: format!("Aggiungi contenuto su: {}", t.topic),
                description: format!("Includi una sezione dedicata a {}", t.topic),
                impact: "Migliora la completezza del contenuto".to_string(),
                topics: vec![t.topic.clone()],
            })
            .collect()
    }
}

fn well_structured() -> Recommendation {
    Recommendation {
        kind: RecommendationKind::General,
        priority: TopicPriority::Medium,
        title: "Contenuto ben strutturato".to_string(),
        description: "L'articolo copre gli argomenti principali dell'AI Overview. Valuta di \
                      arricchirlo con esempi aggiornati e approfondimenti."
            .to_string(),
        impact: "Mantiene il contenuto competitivo".to_string(),
        topics: Vec::new(),
    }
}
