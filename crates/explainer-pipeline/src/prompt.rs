//! Prompt construction for the explain run and follow-up chat

use explainer_domain::ChatMessage;

/// Rules every explain call runs under
pub const SYSTEM_PROMPT: &str = r#"You are a transparency-first assistant.
Rules:
1) Use ONLY the provided CONTEXT to extract evidence quotes.
2) Do not invent evidence, quotes, offsets, or facts.
3) If context is insufficient, say so clearly and lower confidence.
4) Return STRICT JSON only (no markdown, no prose outside JSON).
5) Keep each quote <= 20 words.
6) Make the answer concrete, specific, and practical (not vague).
7) When the user asks why an output happened, explain:
   - likely cause from context
   - what in the context supports it
   - exact next checks the user should run
8) Keep uncertainty honest and include alternative interpretations when context allows.
9) Keep followups lightweight: optional "what-if" questions, not urgent tasks.
10) For black_box_explanation, do NOT give a generic textbook definition.
11) black_box_explanation must explain how the model likely moved from CONTEXT to answer.
"#;

/// The exact JSON shape the model must produce
pub const SCHEMA_INSTRUCTIONS: &str = r#"Return this exact JSON object shape:
{
  "answer": "string",
  "black_box_explanation": "4-6 sentence reasoning summary: which context cues mattered, how they led to the answer, and what stayed uncertain",
  "assumptions": ["string"],
  "evidence_claims": [
    {
      "claim": "a specific black-box behavior/pattern found in CONTEXT",
      "support_reason": "1-2 short sentences explaining the black-box meaning of this quote",
      "quote": "string <= 20 words from CONTEXT",
      "start": 0,
      "end": 0
    }
  ],
  "uncertainty": ["string"],
  "confidence": "low|medium|high",
  "confidence_reason": "string",
  "followups": ["string"]
}
"#;

/// System prompt of the JSON repair call
pub const REPAIR_SYSTEM_PROMPT: &str =
    "Convert text to STRICT valid JSON only. No markdown, no comments, no extra text.";

/// System prompt of the follow-up chat
pub const FOLLOWUP_SYSTEM_PROMPT: &str = r#"You are a serious technical assistant.
Rules:
1) Be direct, professional, and practical. No hype language.
2) Start with a direct answer first (1-2 sentences).
3) If the user asks a normal factual question, answer it plainly and stop.
4) Only use "supported/speculative/safer recommendation" when the user is explicitly asking to evaluate claims from context.
5) If information is weak, speculative, risky, or misleading, say that clearly.
6) Do not overstate certainty.
7) Keep answers concise and useful.
"#;

const ANSWER_STYLE: &str = r#"ANSWER STYLE REQUIREMENTS:
- Write a direct answer that sounds like a strong technical assistant.
- Be specific and actionable.
- If useful, include short numbered steps inside the "answer" string.
- Do not use information outside CONTEXT as evidence.
- Fill "black_box_explanation" with a clear 4-6 sentence explanation for a non-expert user.
- In black_box_explanation, explain:
  1) what signals/cues in CONTEXT were most important,
  2) how those cues support the final answer,
  3) what parts are inferred vs directly stated,
  4) what uncertainty remains.
- Do not output generic AI theory; tie every sentence to this specific QUESTION + CONTEXT.
- For each evidence claim, explain black-box behavior from CONTEXT (not generic restating).
- In "support_reason", explain what the quote implies about opacity, hidden reasoning, or interpretability.
- For "followups", provide 2-4 optional what-if prompts that help exploration.
- Followups should be low-pressure and not critical action items."#;

const CRITIQUE_TASK: &str = r#"You are reviewing a prior analysis JSON for missing uncertainty and weak assumptions.

TASK:
- Keep original answer unless clearly contradicted.
- Add missing uncertainty items and follow-up questions.
- Remove any evidence that is not directly supported by CONTEXT.
- Make uncertainty and follow-ups more concrete.
- Keep follow-ups optional and lightweight (what-if style).
- Return STRICT JSON in the same schema."#;

const FOLLOWUP_INSTRUCTION: &str =
    "If this follow-up is unrelated to the context, answer directly without forcing context analysis.";

/// Builds the message lists sent to the chat backend for one question/context pair
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    question: &'a str,
    context: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder for a question and its source text
    pub fn new(question: &'a str, context: &'a str) -> Self {
        Self { question, context }
    }

    /// Primary call: question, context, style rules and schema
    pub fn primary_messages(&self) -> Vec<ChatMessage> {
        let user = format!(
            "QUESTION:\n{}\n\nCONTEXT:\n{}\n\n{}\n\nOUTPUT JSON SCHEMA:\n{}",
            self.question, self.context, ANSWER_STYLE, SCHEMA_INSTRUCTIONS
        );
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
    }

    /// Repair call: ask for `raw` rewritten as strict JSON
    pub fn repair_messages(&self, raw: &str) -> Vec<ChatMessage> {
        let user = format!(
            "Return valid JSON matching this schema exactly:\n{}\n\nTEXT TO CONVERT:\n{}",
            SCHEMA_INSTRUCTIONS, raw
        );
        vec![ChatMessage::system(REPAIR_SYSTEM_PROMPT), ChatMessage::user(user)]
    }

    /// Critique call: review `prior_json` against the context
    pub fn critique_messages(&self, prior_json: &str) -> Vec<ChatMessage> {
        let user = format!(
            "{}\n\nQUESTION:\n{}\n\nCONTEXT:\n{}\n\nPRIOR_JSON:\n{}\n\nOUTPUT JSON SCHEMA:\n{}",
            CRITIQUE_TASK, self.question, self.context, prior_json, SCHEMA_INSTRUCTIONS
        );
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
    }

    /// Follow-up chat turn about the same question and context
    pub fn followup_messages(&self, followup: &str) -> Vec<ChatMessage> {
        let user = format!(
            "Original question:\n{}\n\nContext:\n{}\n\nFollow-up question:\n{}\n\nInstruction:\n{}",
            self.question, self.context, followup, FOLLOWUP_INSTRUCTION
        );
        vec![ChatMessage::system(FOLLOWUP_SYSTEM_PROMPT), ChatMessage::user(user)]
    }
}
