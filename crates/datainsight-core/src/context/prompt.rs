//! Prompt assembly for the narrative generator.
//!
//! The prompt embeds a [`ContextSummary`] and an instruction, and asks the
//! model for five bold-labelled sections that
//! [`NarrativeExtractor`](crate::narrative::NarrativeExtractor) recovers later.

use crate::error::Result;
use crate::narrative::{
    SECTION_ANOMALIES, SECTION_OPPORTUNITIES, SECTION_OVERVIEW, SECTION_PATTERNS,
    SECTION_RECOMMENDATIONS,
};
use crate::utils::format_number;

use super::ContextSummary;

const REQUESTED_SECTIONS: [(&str, &str); 5] = [
    (SECTION_OVERVIEW, "Resumo executivo dos dados"),
    (SECTION_PATTERNS, "Tendências, correlações e insights principais"),
    (SECTION_ANOMALIES, "Pontos de atenção ou valores atípicos"),
    (SECTION_OPPORTUNITIES, "Insights acionáveis para negócio"),
    (SECTION_RECOMMENDATIONS, "Ações estratégicas específicas"),
];

/// Render the structured analysis prompt around `instruction`.
pub fn render_prompt(summary: &ContextSummary, instruction: &str) -> Result<String> {
    let column_types = if summary.column_types.is_empty() {
        "Não disponível".to_string()
    } else {
        summary
            .column_types
            .iter()
            .map(|c| format!("{}: {}", c.name, c.column_type.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let sections = REQUESTED_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, (label, description))| format!("{}. **{}**: {}", i + 1, label, description))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "Você é um especialista em análise de dados e business intelligence. \
Analise os seguintes dados e forneça insights profundos em português brasileiro.

CONTEXTO DOS DADOS:
- Total de registros: {total}
- Total de colunas: {columns}
- Colunas numéricas: {numeric}
- Colunas categóricas: {categorical}

ESTATÍSTICAS DAS COLUNAS:
{stats}

AMOSTRA DOS DADOS (primeiras {sample_len} linhas):
{sample}

TIPOS DE COLUNAS:
{column_types}

SOLICITAÇÃO ESPECÍFICA:
{instruction}

Por favor, forneça uma análise estruturada incluindo:

{sections}

Responda de forma clara e objetiva, focando em insights práticos e acionáveis.
",
        total = summary.total_records,
        columns = summary.column_count,
        numeric = summary.numeric_column_count,
        categorical = summary.categorical_column_count,
        stats = serde_json::to_string_pretty(&summary.column_stats)?,
        sample_len = summary.sample_records.len(),
        sample = serde_json::to_string_pretty(&summary.sample_records)?,
    ))
}

/// Instruction for a full analysis of the dataset.
pub fn analysis_instruction(summary: &ContextSummary) -> Result<String> {
    let stats = summary
        .column_stats
        .iter()
        .map(|(name, s)| {
            format!(
                "{}: média {:.2}, min {}, max {}, desvio padrão {:.2}",
                name,
                s.mean,
                format_number(s.min),
                format_number(s.max),
                s.std_dev
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    Ok(format!(
        "Analise este dataset de negócios e forneça insights estratégicos profundos:

DADOS DO DATASET:
- {total} registros totais
- {columns} colunas ({numeric} numéricas, {categorical} categóricas)

ESTATÍSTICAS DAS COLUNAS NUMÉRICAS:
{stats}

AMOSTRA DOS DADOS:
{sample}

Por favor, forneça:
1. Análise geral dos padrões nos dados
2. Identificação de tendências e anomalias
3. Oportunidades de negócio baseadas nos dados
4. Recomendações estratégicas específicas
5. Insights acionáveis para tomada de decisão

Seja específico e prático nas recomendações.",
        total = summary.total_records,
        columns = summary.column_count,
        numeric = summary.numeric_column_count,
        categorical = summary.categorical_column_count,
        sample = serde_json::to_string_pretty(&summary.sample_records)?,
    ))
}

/// Instruction answering a free-form question about the dataset.
pub fn question_instruction(question: &str, summary: &ContextSummary) -> Result<String> {
    let columns = summary.column_names().collect::<Vec<_>>().join(", ");

    Ok(format!(
        "Baseado nos dados fornecidos, responda à seguinte pergunta de forma detalhada e prática:

PERGUNTA: {question}

CONTEXTO DOS DADOS:
- {total} registros
- Colunas: {columns}
- Estatísticas: {stats}

Forneça uma resposta específica, acionável e baseada nos dados reais.",
        question = question.trim(),
        total = summary.total_records,
        stats = serde_json::to_string_pretty(&summary.column_stats)?,
    ))
}
