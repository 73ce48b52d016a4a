//! Prompt templates for each analysis type.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the requested response structure
//!    (section labels, bullet groups) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    live model, making template regressions easy to catch.
//!
//! Templates are pure data: [`build_prompt`] is deterministic for identical
//! inputs. The document text is interpolated after truncation to
//! [`PROMPT_CHAR_LIMIT`] characters; a fixed marker is appended when the cap
//! is hit so the model knows the tail was dropped.

use crate::config::AnalysisType;

/// Maximum number of document characters interpolated into a prompt.
pub const PROMPT_CHAR_LIMIT: usize = 30_000;

/// Appended to the document text when it is truncated at the cap.
pub const TRUNCATION_MARKER: &str = "... [texto truncado]";

/// Full general analysis: four numbered sections.
const GENERAL_TEMPLATE: &str = "\
Analiza el siguiente documento y proporciona un análisis completo. Responde en español con esta estructura:

ANÁLISIS GENERAL DEL DOCUMENTO

1. RESUMEN EJECUTIVO
   - Tema principal del documento
   - Objetivos identificados
   - Público objetivo potencial

2. CONTENIDO PRINCIPAL
   - Ideas y argumentos centrales
   - Información más relevante
   - Datos y estadísticas importantes

3. ESTRUCTURA Y ORGANIZACIÓN
   - Cómo está organizado el contenido
   - Flujo de información
   - Calidad de la presentación

4. CONCLUSIONES Y RECOMENDACIONES
   - Conclusiones principales
   - Aplicaciones prácticas
   - Sugerencias de mejora

Documento:
";

/// Executive summary: four labelled bullet groups.
const SUMMARY_TEMPLATE: &str = "\
Proporciona un resumen ejecutivo conciso del siguiente documento. Responde en español con esta estructura:

RESUMEN EJECUTIVO

• OBJETIVO PRINCIPAL: [Objetivo del documento]
• PUNTOS CLAVE: [3-5 puntos más importantes]
• CONCLUSIONES: [Conclusiones principales]
• APLICACIONES: [Posibles usos o aplicaciones]

Documento:
";

/// Key-point extraction: emoji-labelled groups.
const KEYPOINTS_TEMPLATE: &str = "\
Extrae los puntos clave del siguiente documento. Responde en español con esta estructura:

PUNTOS CLAVE DEL DOCUMENTO

📌 INFORMACIÓN ESENCIAL:
   - [Lista de puntos importantes]

🔍 DATOS RELEVANTES:
   - [Datos, estadísticas o cifras]

💡 CONCLUSIONES PRINCIPALES:
   - [Conclusiones más significativas]

🎯 RECOMENDACIONES:
   - [Recomendaciones o llamados a la acción]

Documento:
";

/// Question/answer generation.
const QA_TEMPLATE: &str = "\
Analiza el siguiente documento y genera preguntas y respuestas relevantes. Responde en español:

PREGUNTAS Y RESPUESTAS SOBRE EL DOCUMENTO

❓ **Pregunta 1:** [Pregunta importante sobre el contenido]
   **Respuesta:** [Respuesta basada en el documento]

❓ **Pregunta 2:** [Otra pregunta relevante]
   **Respuesta:** [Respuesta basada en el documento]

❓ **Pregunta 3:** [Pregunta sobre implicaciones]
   **Respuesta:** [Respuesta basada en el documento]

❓ **Pregunta 4:** [Pregunta sobre aplicación práctica]
   **Respuesta:** [Respuesta basada en el documento]

Documento:
";

/// The template for an analysis type, ending just before the document text.
pub fn template(analysis_type: AnalysisType) -> &'static str {
    match analysis_type {
        AnalysisType::General => GENERAL_TEMPLATE,
        AnalysisType::Summary => SUMMARY_TEMPLATE,
        AnalysisType::Keypoints => KEYPOINTS_TEMPLATE,
        AnalysisType::Qa => QA_TEMPLATE,
    }
}

/// Cap the document text at `limit` characters.
///
/// Returns the (possibly truncated) text and whether truncation happened.
/// The limit counts Unicode scalar values, so the cut never lands inside a
/// multi-byte sequence. At or under the limit the text passes through
/// unchanged, with no marker.
pub fn truncate_document(text: &str, limit: usize) -> (String, bool) {
    if text.chars().count() <= limit {
        return (text.to_string(), false);
    }
    let mut capped: String = text.chars().take(limit).collect();
    capped.push_str(TRUNCATION_MARKER);
    (capped, true)
}

/// Build the final prompt for an analysis type and document text.
///
/// Returns the prompt and whether the document text was truncated.
pub fn build_prompt(
    analysis_type: AnalysisType,
    document_text: &str,
    limit: usize,
) -> (String, bool) {
    let (text, truncated) = truncate_document(document_text, limit);
    let mut prompt = String::with_capacity(template(analysis_type).len() + text.len());
    prompt.push_str(template(analysis_type));
    prompt.push_str(&text);
    (prompt, truncated)
}
