//! Prompt templates for each summary tier.

use crate::models::SummaryTier;

pub const SHORT_PROMPT: &str = "Create a very concise summary of this book in about 100-150 words. Focus only on the most important points:";

pub const BRIEF_PROMPT: &str = "Create a brief summary of this book in about 300-400 words. Include the main themes and key points:";

pub const DETAILED_PROMPT: &str = "Create a detailed summary of this book in about 800-1000 words. Include all major themes, key events, and conclusions:";

/// Instruction text for a tier.
pub fn tier_prompt(tier: SummaryTier) -> &'static str {
    match tier {
        SummaryTier::Short => SHORT_PROMPT,
        SummaryTier::Brief => BRIEF_PROMPT,
        SummaryTier::Detailed => DETAILED_PROMPT,
    }
}

/// Full prompt: the tier instruction, a blank line, then the book text.
pub fn build_prompt(tier: SummaryTier, text: &str) -> String {
    format!("{}\n\n{}", tier_prompt(tier), text)
}
