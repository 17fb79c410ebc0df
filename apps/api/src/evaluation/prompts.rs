//! Instruction templates for the three evaluation actions.
//!
//! These are fixed strings selected by which endpoint was hit — they are the
//! only varying "configuration" of a model request and are not user-editable.

use serde::Serialize;

/// The three evaluation actions, one per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalAction {
    /// General recruiter-style evaluation of the resume against the JD.
    Review,
    /// Skill-improvement suggestions.
    Skills,
    /// ATS-style percentage match.
    Match,
}

impl EvalAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EvalAction::Review => "review",
            EvalAction::Skills => "skills",
            EvalAction::Match => "match",
        }
    }

    /// The fixed instruction template sent as the first part of the request.
    pub fn instruction(self) -> &'static str {
        match self {
            EvalAction::Review => REVIEW_INSTRUCTION,
            EvalAction::Skills => SKILLS_INSTRUCTION,
            EvalAction::Match => MATCH_INSTRUCTION,
        }
    }
}

const REVIEW_INSTRUCTION: &str = "\
You are an experienced Technical Human Resource Manager. Review the provided \
resume image against the job description and share a professional evaluation \
of whether the candidate's profile aligns with the role. Highlight where the \
profile is strong and where it falls short relative to the stated requirements. \
Format in bullet points with headings: Overall Alignment, Strengths, Weaknesses, \
Recommendation.";

const SKILLS_INSTRUCTION: &str = "\
You are a career development coach. Review the provided resume image against \
the job description and suggest how the candidate can improve their skills to \
better fit the role. Be specific and practical. Format as actionable bullet \
points under headings: Technical Skills, Soft Skills, Certifications, Tools.";

const MATCH_INSTRUCTION: &str = "\
You are a skilled ATS (Applicant Tracking System) scanner with a deep \
understanding of how ATS software screens resumes. Evaluate the provided \
resume image against the job description and give the percentage match. \
First output the percentage, then keywords missing from the resume, and \
finally your closing remarks. Format clearly: Percentage Match, Missing \
Keywords, Final Thoughts.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_action_has_distinct_instruction() {
        let review = EvalAction::Review.instruction();
        let skills = EvalAction::Skills.instruction();
        let matching = EvalAction::Match.instruction();
        assert_ne!(review, skills);
        assert_ne!(skills, matching);
        assert_ne!(review, matching);
    }

    #[test]
    fn test_match_instruction_asks_for_percentage() {
        assert!(EvalAction::Match.instruction().contains("Percentage Match"));
    }

    #[test]
    fn test_action_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&EvalAction::Match).unwrap(),
            r#""match""#
        );
    }

    #[test]
    fn test_as_str_matches_endpoint_names() {
        assert_eq!(EvalAction::Review.as_str(), "review");
        assert_eq!(EvalAction::Skills.as_str(), "skills");
        assert_eq!(EvalAction::Match.as_str(), "match");
    }
}
