//! Display-ready insight reports built from a narrative reply.
//!
//! Extraction leaves absent fields empty; this module is where default copy
//! is substituted, so a report always has something to show.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::narrative::{
    NarrativeResult, SECTION_OPPORTUNITIES, SECTION_OVERVIEW, SECTION_PATTERNS,
    SECTION_RECOMMENDATIONS,
};
use crate::utils::truncate_chars;

/// Characters of raw text used as overview when no overview section exists.
const OVERVIEW_FALLBACK_CHARS: usize = 300;

const DEFAULT_INSIGHTS: [&str; 3] = [
    "Análise detalhada dos dados concluída",
    "Padrões significativos identificados",
    "Recomendações estratégicas disponíveis",
];

const DEFAULT_KEY_FINDINGS: [&str; 3] = [
    "Dados processados com sucesso",
    "Insights estratégicos identificados",
    "Análise completa disponível",
];

const DEFAULT_RELATED_INSIGHTS: [&str; 3] = [
    "Análise baseada nos dados fornecidos",
    "Recomendações específicas para sua pergunta",
    "Insights adicionais disponíveis",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Trend,
    Opportunity,
}

/// A headline pattern with its suggested follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCard {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Impact,
    pub action: String,
    pub rationale: String,
    pub expected_impact: String,
}

/// Structured insight for display, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    pub overview: String,
    pub patterns: Vec<PatternCard>,
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
    pub key_findings: Vec<String>,
    /// The narrative text exactly as received.
    pub raw_response: String,
    pub model_used: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

/// Answer to a free-form question about the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAnswer {
    pub question: String,
    pub answer: String,
    pub related_insights: Vec<String>,
    pub model: String,
    pub timestamp: String,
}

fn section_or(result: &NarrativeResult, label: &str, default: &str) -> String {
    result.section(label).unwrap_or(default).to_string()
}

fn or_defaults(items: &[String], defaults: &[&str]) -> Vec<String> {
    if items.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        items.to_vec()
    }
}

/// Overview section, else the leading characters of the raw text.
fn overview(result: &NarrativeResult, raw: &str) -> String {
    match result.section(SECTION_OVERVIEW) {
        Some(text) => text.to_string(),
        None => format!("{}...", truncate_chars(raw, OVERVIEW_FALLBACK_CHARS)),
    }
}

fn rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl InsightReport {
    /// Assemble a report stamped with the current time.
    pub fn assemble(result: &NarrativeResult, raw: &str, model: &str) -> Self {
        Self::assemble_at(result, raw, model, Utc::now())
    }

    pub fn assemble_at(result: &NarrativeResult, raw: &str, model: &str, at: DateTime<Utc>) -> Self {
        let recommendation = result.section(SECTION_RECOMMENDATIONS);

        let patterns = vec![
            PatternCard {
                kind: PatternKind::Trend,
                title: "Padrões Identificados".to_string(),
                description: section_or(result, SECTION_PATTERNS, "Análise de padrões em andamento"),
                impact: Impact::High,
                recommendation: recommendation
                    .unwrap_or("Revisar dados para identificar oportunidades")
                    .to_string(),
            },
            PatternCard {
                kind: PatternKind::Opportunity,
                title: "Oportunidades de Negócio".to_string(),
                description: section_or(
                    result,
                    SECTION_OPPORTUNITIES,
                    "Identificação de oportunidades baseada nos dados",
                ),
                impact: Impact::Medium,
                recommendation: "Implementar melhorias baseadas nos insights identificados"
                    .to_string(),
            },
        ];

        let recommendations = vec![Recommendation {
            priority: Impact::High,
            action: recommendation
                .unwrap_or("Implementar melhorias baseadas na análise")
                .to_string(),
            rationale: "Baseado nos padrões identificados nos dados".to_string(),
            expected_impact: "Melhoria significativa nos resultados de negócio".to_string(),
        }];

        let insights = if result.bullet_items.is_empty() {
            or_defaults(&result.key_sentences, &DEFAULT_INSIGHTS)
        } else {
            result.bullet_items.clone()
        };

        Self {
            overview: overview(result, raw),
            patterns,
            insights,
            recommendations,
            key_findings: or_defaults(&result.key_sentences, &DEFAULT_KEY_FINDINGS),
            raw_response: raw.to_string(),
            model_used: model.to_string(),
            timestamp: rfc3339(at),
        }
    }
}

impl CustomAnswer {
    /// Answer built from a reply to a question prompt.
    pub fn assemble(question: &str, result: &NarrativeResult, raw: &str, model: &str) -> Self {
        Self::assemble_at(question, result, raw, model, Utc::now())
    }

    pub fn assemble_at(
        question: &str,
        result: &NarrativeResult,
        raw: &str,
        model: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let answer = match result.section(SECTION_OVERVIEW) {
            Some(text) => text.to_string(),
            None if !raw.trim().is_empty() => raw.trim().to_string(),
            None => "Resposta processada com sucesso.".to_string(),
        };

        let related_insights = if result.bullet_items.is_empty() {
            or_defaults(&result.key_sentences, &DEFAULT_RELATED_INSIGHTS)
        } else {
            result.bullet_items.clone()
        };

        Self {
            question: question.trim().to_string(),
            answer,
            related_insights,
            model: model.to_string(),
            timestamp: rfc3339(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::narrative::NarrativeExtractor;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn extract(text: &str) -> NarrativeResult {
        NarrativeExtractor::new(&AnalysisConfig::default()).extract_default(text)
    }

    #[test]
    fn test_report_from_structured_reply() {
        let raw = "**VISÃO GERAL**: Vendas estáveis no semestre.\n\
                   **OPORTUNIDADES**: Ampliar presença no Oeste.\n\
                   **RECOMENDAÇÕES**: Revisar custos logísticos.";
        let report = InsightReport::assemble_at(&extract(raw), raw, "gemini-1.5-flash", fixed_time());

        assert_eq!(report.overview, "Vendas estáveis no semestre.");
        assert_eq!(report.patterns[0].description, "Análise de padrões em andamento");
        assert_eq!(report.patterns[0].recommendation, "Revisar custos logísticos.");
        assert_eq!(report.patterns[1].description, "Ampliar presença no Oeste.");
        assert_eq!(report.recommendations[0].action, "Revisar custos logísticos.");
        assert_eq!(report.raw_response, raw);
        assert_eq!(report.model_used, "gemini-1.5-flash");
        assert_eq!(report.timestamp, "2024-03-01T12:30:00.000Z");
    }

    #[test]
    fn test_overview_falls_back_to_leading_text() {
        let raw = "x".repeat(500);
        let report = InsightReport::assemble_at(&extract(&raw), &raw, "m", fixed_time());

        assert_eq!(report.overview.chars().count(), 303);
        assert!(report.overview.ends_with("..."));
    }

    #[test]
    fn test_defaults_for_unstructured_reply() {
        let raw = "ok";
        let report = InsightReport::assemble_at(&extract(raw), raw, "m", fixed_time());

        assert_eq!(report.overview, "ok...");
        assert_eq!(report.insights, DEFAULT_INSIGHTS.map(String::from).to_vec());
        assert_eq!(report.key_findings, DEFAULT_KEY_FINDINGS.map(String::from).to_vec());
        assert_eq!(
            report.recommendations[0].action,
            "Implementar melhorias baseadas na análise"
        );
    }

    #[test]
    fn test_insights_fall_back_to_key_sentences() {
        let raw = "O faturamento do Norte cresceu acima da média. Sem mais.";
        let report = InsightReport::assemble_at(&extract(raw), raw, "m", fixed_time());

        assert_eq!(report.insights, vec!["O faturamento do Norte cresceu acima da média"]);
        assert_eq!(report.key_findings, report.insights);
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = InsightReport::assemble_at(&extract("ok"), "ok", "m", fixed_time());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["patterns"][0]["type"], "trend");
        assert_eq!(json["patterns"][1]["impact"], "medium");
        assert_eq!(json["recommendations"][0]["priority"], "high");
        assert!(json["recommendations"][0]["expectedImpact"].is_string());
        assert_eq!(json["modelUsed"], "m");
        assert_eq!(json["rawResponse"], "ok");
    }

    #[test]
    fn test_custom_answer() {
        let raw = "  A região Norte vende mais, com média de 6 mil por pedido.  ";
        let answer =
            CustomAnswer::assemble_at(" Quem vende mais? ", &extract(raw), raw, "m", fixed_time());

        assert_eq!(answer.question, "Quem vende mais?");
        assert_eq!(answer.answer, raw.trim());
        assert_eq!(
            answer.related_insights,
            vec!["A região Norte vende mais, com média de 6 mil por pedido"]
        );

        let empty = CustomAnswer::assemble_at("q", &NarrativeResult::default(), "", "m", fixed_time());
        assert_eq!(empty.answer, "Resposta processada com sucesso.");
        assert_eq!(empty.related_insights.len(), 3);
    }
}
