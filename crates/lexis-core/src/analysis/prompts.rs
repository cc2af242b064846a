use super::{ContentSegment, ModelInvocation, ResponseMode};
use crate::models::AnalysisRequest;

/// Number of salient terms requested for word frequency.
pub const WORD_FREQUENCY_TOP_N: usize = 10;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert linguist and editor. \
You analyze writing precisely and return machine-readable JSON only.";

pub const CONTENT_LABEL: &str = "Content to analyze:";

/// Literal result shape embedded in grounded prompts, where no schema can be enforced.
const GROUNDED_JSON_SHAPE: &str = r#"{
  "summary": "string",
  "readabilityScore": 0,
  "sentiment": "positive" | "neutral" | "negative",
  "suggestions": [
    {
      "original": "string",
      "improvement": "string",
      "reason": "string",
      "type": "grammar" | "clarity" | "style"
    }
  ],
  "wordFrequency": [
    { "word": "string", "count": 1 }
  ],
  "factCheck": {
    "verified": true,
    "notes": "string",
    "sources": ["string"]
  }
}"#;

/// Build the single model invocation for a request.
/// The file (if any) goes first as an inline segment; instructions and any
/// free text follow in one text segment, with the text under its own label.
pub fn build_invocation(request: &AnalysisRequest) -> ModelInvocation {
    let mode = ResponseMode::for_search(request.enable_search);
    let has_file = request.attached_file().is_some();

    let mut segments = Vec::new();
    if let Some(file) = request.attached_file() {
        segments.push(ContentSegment::Inline {
            mime_type: file.mime_type.clone(),
            data: file.data.clone(),
        });
    }

    let text = if request.has_text() {
        Some(request.text.as_str())
    } else {
        None
    };
    segments.push(ContentSegment::Text(build_analysis_prompt(
        &mode, has_file, text,
    )));

    ModelInvocation {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        segments,
        mode,
    }
}

/// Build the instruction text for one analysis.
pub fn build_analysis_prompt(mode: &ResponseMode, has_file: bool, text: Option<&str>) -> String {
    let subject = match (has_file, text.is_some()) {
        (true, true) => "the attached file together with the text below",
        (true, false) => "the attached file",
        _ => "the text below",
    };

    let mut prompt = format!(
        r#"Perform a linguistic analysis of {subject}.

1. **Summary**: Write a concise summary of the content.
2. **Readability**: Compute a readability score from 0 (very difficult) to 100 (very easy).
3. **Sentiment**: Classify the overall sentiment as exactly one of "positive", "neutral" or "negative".
4. **Suggestions**: List sentence-level rewrite suggestions. For each, give the original sentence, the improved sentence, the reason, and a type of "grammar", "clarity" or "style".
5. **Word frequency**: Count occurrences of the top {WORD_FREQUENCY_TOP_N} salient terms, excluding stopwords (articles, pronouns, auxiliaries, prepositions)."#
    );

    if mode.uses_search() {
        prompt.push_str(&format!(
            r#"
6. **Fact check**: Use web search to verify the factual claims in the content. Report whether they hold up in "factCheck".

## Response Format

Return a single JSON object with exactly this shape:

{GROUNDED_JSON_SHAPE}

CRITICAL: Return ONLY the raw JSON object. Do not wrap it in markdown code fences. No prose before or after it."#
        ));
    }

    if let Some(text) = text {
        prompt.push_str("\n\n");
        prompt.push_str(CONTENT_LABEL);
        prompt.push('\n');
        prompt.push_str(text);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilePayload;

    fn text_segments(invocation: &ModelInvocation) -> Vec<&str> {
        invocation
            .segments
            .iter()
            .filter_map(|s| match s {
                ContentSegment::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_text_only_structured() {
        let req = AnalysisRequest::new("The cat sat on the mat.");
        let inv = build_invocation(&req);
        assert!(matches!(inv.mode, ResponseMode::Structured { .. }));
        assert_eq!(inv.segments.len(), 1);
        let text = text_segments(&inv)[0];
        assert!(text.contains("Content to analyze:\nThe cat sat on the mat."));
        assert!(!text.contains("factCheck"));
        assert!(!text.contains("web search"));
    }

    #[test]
    fn test_all_five_instructions_present_in_both_modes() {
        for search in [false, true] {
            let req = AnalysisRequest::new("Hello there.").with_search(search);
            let inv = build_invocation(&req);
            let text = text_segments(&inv)[0];
            assert!(text.contains("Summary"));
            assert!(text.contains("0 (very difficult) to 100 (very easy)"));
            assert!(text.contains(r#""positive", "neutral" or "negative""#));
            assert!(text.contains(r#""grammar", "clarity" or "style""#));
            assert!(text.contains("excluding stopwords"));
        }
    }

    #[test]
    fn test_grounded_prompt_embeds_shape() {
        let req = AnalysisRequest::new("Water boils at 90C at sea level.").with_search(true);
        let inv = build_invocation(&req);
        assert_eq!(inv.mode, ResponseMode::Grounded);
        let text = text_segments(&inv)[0];
        assert!(text.contains("\"readabilityScore\""));
        assert!(text.contains("\"factCheck\""));
        assert!(text.contains("Do not wrap it in markdown code fences"));
        // Subject text comes after the instructions
        let shape_pos = text.find("\"wordFrequency\"").unwrap();
        let content_pos = text.find(CONTENT_LABEL).unwrap();
        assert!(content_pos > shape_pos);
    }

    #[test]
    fn test_file_precedes_text_segment() {
        let req = AnalysisRequest::new("Focus on tone.")
            .with_file(FilePayload::from_bytes("application/pdf", b"%PDF-1.4"));
        let inv = build_invocation(&req);
        assert_eq!(inv.segments.len(), 2);
        assert!(matches!(
            &inv.segments[0],
            ContentSegment::Inline { mime_type, .. } if mime_type == "application/pdf"
        ));
        let text = text_segments(&inv)[0];
        assert!(text.contains("the attached file together with the text below"));
        assert!(text.ends_with("Content to analyze:\nFocus on tone."));
    }

    #[test]
    fn test_file_only_has_no_content_label() {
        let req = AnalysisRequest::new("").with_file(FilePayload::from_bytes("text/plain", b"hi"));
        let inv = build_invocation(&req);
        let text = text_segments(&inv)[0];
        assert!(text.contains("of the attached file."));
        assert!(!text.contains(CONTENT_LABEL));
    }

    #[test]
    fn test_empty_file_payload_not_attached() {
        let req = AnalysisRequest::new("Some text").with_file(FilePayload {
            mime_type: "text/plain".to_string(),
            data: String::new(),
        });
        let inv = build_invocation(&req);
        assert_eq!(inv.segments.len(), 1);
    }
}
