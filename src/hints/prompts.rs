//! Prompt templates for the three disclosure levels.
//!
//! Every level shares one system prompt; the user prompt narrows what the
//! model may reveal. Level 3 is the closest the hints ever get: the full
//! substituted setup, with the final arithmetic left to the learner.

use crate::hints::context::ProblemContext;
use crate::hints::level::HintLevel;

pub const SYSTEM_PROMPT: &str = "You are an encouraging math tutor who gives clear, detailed hints. \
Be specific and use the concrete numbers from the problem. Never give away the final answer; \
guide the student one step at a time in simple, thorough language.";

fn level_instructions(level: HintLevel) -> &'static str {
    match level {
        HintLevel::First => {
            "Give a first hint that helps the student understand:
1. What kind of problem this is (distance/rate/time, area, percentage, ...)
2. What they are being asked to find
3. Which information the problem gives them
4. A general strategy, naming the relevant formula if there is one

Refer to the actual numbers and context, but do not solve anything. Write 3-4 sentences."
        }
        HintLevel::Second => {
            "The student has already seen a hint about the problem type and approach. Give a second, more detailed hint that:
1. Writes out exactly which formula or equation to use
2. Names every variable in that formula
3. Shows which value from the problem goes with which variable
4. Says what the next step is

Use the actual numbers from the problem. Write 4-5 sentences."
        }
        HintLevel::Third => {
            "The student has seen two hints and still needs help. Give a third and final hint that:
1. States the complete formula or equation
2. Shows the full substitution with the problem's numbers (e.g. \"speed = 120 km / 2 hours\")
3. Shows the expression ready to evaluate (e.g. \"= 120 / 2\")
4. Says which units the answer must be in
5. Names the operation that produces the final answer

Give everything except the final computed number: the student must do exactly one calculation. Write 5-7 sentences."
        }
    }
}

/// Render the user prompt for `level`.
///
/// Equation data, when present, is appended so the model can lean on the
/// already-extracted formula instead of guessing one.
pub fn hint_prompt(context: &ProblemContext, level: HintLevel) -> String {
    let mut prompt = format!(
        "A student is working on this problem:\n\n\"{}\"\n\n{}",
        context.problem(),
        level_instructions(level)
    );

    if let Some(eq) = context.equation() {
        prompt.push_str("\n\nThe equation for this problem has already been identified:");
        prompt.push_str(&format!("\n- Equation: {}", eq.equation));
        if !eq.substituted_equation.is_empty() {
            prompt.push_str(&format!("\n- With values substituted: {}", eq.substituted_equation));
        }
        if !eq.variables.is_empty() {
            prompt.push_str(&format!("\n- Variables: {}", eq.variables.join(", ")));
        }
    }

    prompt
}

/// System and user prompt joined for completion-style APIs that take a
/// single prompt string
pub fn combined_prompt(context: &ProblemContext, level: HintLevel) -> String {
    format!("{}\n\n{}", SYSTEM_PROMPT, hint_prompt(context, level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::context::EquationData;

    fn rate_problem(equation: Option<EquationData>) -> ProblemContext {
        ProblemContext::new("A car travels 120 km in 2 hours. What is its speed?", equation).unwrap()
    }

    #[test]
    fn test_each_level_has_its_own_instructions() {
        let ctx = rate_problem(None);
        let first = hint_prompt(&ctx, HintLevel::First);
        let second = hint_prompt(&ctx, HintLevel::Second);
        let third = hint_prompt(&ctx, HintLevel::Third);

        assert!(first.contains("What kind of problem"));
        assert!(second.contains("which formula"));
        assert!(third.contains("exactly one calculation"));
        for prompt in [&first, &second, &third] {
            assert!(prompt.contains("120 km in 2 hours"));
        }
    }

    #[test]
    fn test_equation_data_is_appended_when_present() {
        let without = hint_prompt(&rate_problem(None), HintLevel::Second);
        assert!(!without.contains("already been identified"));

        let ctx = rate_problem(Some(EquationData {
            equation: "v = d / t".to_string(),
            substituted_equation: "v = 120 / 2".to_string(),
            variables: vec!["v".to_string(), "d".to_string(), "t".to_string()],
        }));
        let with = hint_prompt(&ctx, HintLevel::Second);
        assert!(with.contains("Equation: v = d / t"));
        assert!(with.contains("With values substituted: v = 120 / 2"));
        assert!(with.contains("Variables: v, d, t"));
    }

    #[test]
    fn test_combined_prompt_leads_with_system_prompt() {
        let combined = combined_prompt(&rate_problem(None), HintLevel::First);
        assert!(combined.starts_with(SYSTEM_PROMPT));
        assert!(combined.contains("Never give away the final answer"));
    }
}
