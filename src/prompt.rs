//! Prompt templates for the conversation pipeline
//!
//! The corpus is Spanish-language course material, so the generation prompt
//! pins the answer language to Spanish while the retrieval-side prompts work
//! in English (the embedding model is English-tuned).

/// Grounded response generation prompt
pub fn response_generation(context: &str, question: &str, previous_messages: &str) -> String {
    format!(
        r#"INSTRUCTIONS:
You are a Spanish chatbot that helps university students answer questions about a given context.
Answer the users QUESTION using the CONTEXT provided and considering the PREVIOUS_MESSAGES if relevant.
Keep your answer grounded in the facts of the CONTEXT.
If the CONTEXT doesn't contain the facts to answer the QUESTION return "No tengo la respuesta para eso"

CONSIDERATIONS:
- The answer should be in Spanish.
- The answer should be formal.
- Maintain conversation continuity based on PREVIOUS_MESSAGES.

PREVIOUS_MESSAGES:
{previous_messages}

QUESTION:
{question}

CONTEXT:
{context}
"#
    )
}

/// Translation/normalization prompt applied to the raw user message
pub fn translate_user_message(user_message: &str) -> String {
    format!(
        r#"Translate the following user message to English:
{user_message}

Focus on improving the user message to make it more understandable and clear in English.
The translation should be concise and accurate.

RETURN FORMAT:
- Only answer with the translated message.
- Do not include any additional information.
- The translation should be in English.
"#
    )
}

/// Query decomposition prompt, constrained to a JSON object
pub fn queries_generator(user_message: &str, domain: &str) -> String {
    format!(
        r#"**Objective**: Generate 5 diverse search queries tailored to retrieve information from a university course document about {domain}. The user's message is:

----------------
{user_message}
----------------

**Instructions**:
1. Create queries that:
   - Focus on aspects of {domain} likely covered by course material
   - Include specific techniques, mechanisms or named concepts when the user message mentions them
   - Use a mix of keyword phrases and question formats
   - Explore definitions, applications, benefits or limitations relevant to the user message

2. Format requirements:
   - Each query should be concise (15 words or fewer)
   - Between 2 and 5 queries, no duplicates
   - The queries should be optimized for retrieving relevant passages from the document

RETURN FORMAT:
Respond with a JSON object only, no prose:
{{"queries": ["first query", "second query", "..."]}}
"#
    )
}

/// Hallucination assessment prompt, constrained to a JSON object
pub fn hallucination_detector(response: &str, documents: &str) -> String {
    format!(
        r#"INSTRUCTIONS:
Assess the quality of the response based on the retrieved documents.
The response should only contain information from the retrieved documents.
If the response contains information not present in the documents, mark it as a hallucination.

RESPONSE:
{response}

DOCUMENTS:
{documents}

RETURN FORMAT:
Respond with a JSON object only, no prose:
{{"is_hallucination": true}} or {{"is_hallucination": false}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_prompt_embeds_sections() {
        let prompt = response_generation("some facts", "¿qué es?", "user: hola");
        assert!(prompt.contains("CONTEXT:\nsome facts"));
        assert!(prompt.contains("QUESTION:\n¿qué es?"));
        assert!(prompt.contains("PREVIOUS_MESSAGES:\nuser: hola"));
    }

    #[test]
    fn test_queries_prompt_mentions_domain() {
        let prompt = queries_generator("vacunas", "Inmunología");
        assert!(prompt.contains("Inmunología"));
        assert!(prompt.contains("\"queries\""));
    }

    #[test]
    fn test_hallucination_prompt_embeds_both_sides() {
        let prompt = hallucination_detector("la respuesta", "los documentos");
        assert!(prompt.contains("RESPONSE:\nla respuesta"));
        assert!(prompt.contains("DOCUMENTS:\nlos documentos"));
    }
}
