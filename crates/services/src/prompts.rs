//! Prompt templates sent to the generative model.

use quiz_core::model::Difficulty;

const TUTOR_ROLE: &str = "You are a Network Architecture tutor.";

/// Ask for exactly one question in the line-marker format `quiz_core::parse` accepts.
#[must_use]
pub fn question_prompt(topic: &str, difficulty: Difficulty) -> String {
    format!(
        "You are a Network Architecture expert who writes exam questions.\n\
         Write one multiple-choice question about \"{topic}\" for a student at the \
         \"{difficulty}\" level.\n\
         \n\
         Follow this format strictly, one field per line:\n\
         \n\
         Question: <question text>\n\
         A) <option A>\n\
         B) <option B>\n\
         C) <option C>\n\
         D) <option D>\n\
         Correct answer: <letter of the correct option, e.g. A>\n\
         Explanation: <why that option is correct and the others are not>\n\
         \n\
         Exactly one option must be correct and every option must be plausible. \
         Do not add any text before or after the question."
    )
}

#[must_use]
pub fn explain_prompt(topic: &str) -> String {
    format!(
        "{TUTOR_ROLE} Explain the concept of {topic} clearly, concisely and step by step, \
         as you would to a university student. Include examples where relevant."
    )
}

#[must_use]
pub fn exercise_prompt(topic: &str, difficulty: Difficulty) -> String {
    format!(
        "{TUTOR_ROLE} Create a new, original problem about {topic} for a student at the \
         {difficulty} level. Make sure it fits the topic and the difficulty. \
         Do not include the solution."
    )
}

#[must_use]
pub fn review_prompt(exercise: &str, answer: &str) -> String {
    format!(
        "{TUTOR_ROLE} A student was given this exercise:\n\n{exercise}\n\n\
         The student answered:\n\n{answer}\n\n\
         Say whether the answer is correct, point out any mistakes, and give the \
         correct reasoning in a few short paragraphs."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_prompt_names_every_marker() {
        let prompt = question_prompt("VLANs", Difficulty::Advanced);
        assert!(prompt.contains("\"VLANs\""));
        assert!(prompt.contains("\"advanced\""));
        for marker in ["Question:", "A)", "D)", "Correct answer:", "Explanation:"] {
            assert!(prompt.contains(marker), "missing {marker}");
        }
    }

    #[test]
    fn review_prompt_embeds_both_texts() {
        let prompt = review_prompt("Subnet 10.0.0.0/24 into 4", "Use /26");
        assert!(prompt.contains("Subnet 10.0.0.0/24 into 4"));
        assert!(prompt.contains("Use /26"));
    }
}
