//! The instruction sent with every page image.
//!
//! Kept in one place so prompt changes never touch the HTTP or parsing code,
//! and so tests can assert on it directly.

/// Instruction prompt for extracting multiple-choice questions from a page.
///
/// Asks for a bare JSON array; models still wrap it in code fences often
/// enough that [`crate::pipeline::postprocess::strip_code_fence`] runs on
/// every answer.
pub const EXTRACTION_PROMPT: &str = concat!(
    "Extract the exam questions, multiple-choice options, correct answers, and justifications from this image. ",
    "If any text is unclear due to image quality or OCR artifacts, use your expertise to enhance the text and ",
    "make the best educated guess possible to ensure consistency and professional integrity. ",
    "Output ONLY a JSON array of objects with the following structure: ",
    r#"[{"number": "1", "question": "Question text...", "options": {"A": "...", "B": "...", "C": "...", "D": "..."}, "answer": "C", "justification": {"A": "...", "B": "...", "C": "...", "D": "..."}}]. "#,
    "Exclude all headers, footers, page numbers, and any other text not part of a question or its explanation. ",
    "If a question is split across pages, provide only the full questions that start on this page. ",
    "Return ONLY valid JSON. DO NOT include any conversational text, introductory remarks, or explanations. ",
    "If no multiple-choice questions are found on this page, return an empty array `[]`."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_describes_the_record_shape() {
        for key in ["\"number\"", "\"question\"", "\"options\"", "\"answer\"", "\"justification\""] {
            assert!(EXTRACTION_PROMPT.contains(key), "missing {key}");
        }
    }

    #[test]
    fn prompt_covers_split_questions_and_empty_pages() {
        assert!(EXTRACTION_PROMPT.contains("start on this page"));
        assert!(EXTRACTION_PROMPT.contains("empty array `[]`"));
    }
}
