// Prompt construction for review classification

use super::Sentiment;

/// One worked example embedded in every prompt
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub review: &'static str,
    pub label: Sentiment,
    pub evidence: &'static [&'static str],
}

/// One example per label, in `Sentiment::ALL` order
pub const FEW_SHOT_EXAMPLES: [FewShotExample; 3] = [
    FewShotExample {
        review: "This movie was absolutely fantastic! The acting was superb and the storyline kept me engaged throughout.",
        label: Sentiment::Positive,
        evidence: &["fantastic", "superb acting", "engaging storyline"],
    },
    FewShotExample {
        review: "Terrible film. Poor acting, boring plot, and wasted my time completely.",
        label: Sentiment::Negative,
        evidence: &["Terrible", "poor acting", "boring plot", "wasted my time"],
    },
    FewShotExample {
        review: "It was okay. Nothing special but not bad either. The cinematography was decent.",
        label: Sentiment::Neutral,
        evidence: &["okay", "nothing special", "not bad", "decent cinematography"],
    },
];

const INSTRUCTIONS: &str = "Analyze the sentiment of this movie review and provide:
1. Sentiment label: Positive, Negative, or Neutral
2. Confidence score between 0-1
3. Brief explanation (1-2 sentences)
4. 2-3 key evidence phrases from the text that support your analysis";

const OUTPUT_FORMAT: &str = r#"Return ONLY a valid JSON object with this exact structure:
{
    "label": "Positive|Negative|Neutral",
    "confidence": 0.00,
    "explanation": "short reason",
    "evidence_phrases": ["phrase1", "phrase2"]
}"#;

/// Render the few-shot block
pub fn render_examples() -> String {
    let mut block = String::from("Examples:\n");
    for example in FEW_SHOT_EXAMPLES.iter() {
        let evidence = example
            .evidence
            .iter()
            .map(|phrase| format!("\"{}\"", phrase))
            .collect::<Vec<_>>()
            .join(", ");
        block.push_str(&format!(
            "\nReview: \"{}\"\nSentiment: {}\nEvidence: {}\n",
            example.review, example.label, evidence
        ));
    }
    block
}

/// Build the full classification prompt for `review_text`.
///
/// The output is a pure function of the input; the review is embedded
/// verbatim.
pub fn build_prompt(review_text: &str) -> String {
    format!(
        "{}\n\n{}\nReview: \"{}\"\n\n{}",
        INSTRUCTIONS,
        render_examples(),
        review_text,
        OUTPUT_FORMAT
    )
}
