//! Prompt shaping for creation functions and composition.

use crate::image::types::CreateFunction;

/// Applies the creation function's styling to a user prompt.
pub fn augment_prompt(prompt: &str, function: CreateFunction) -> String {
    match function {
        CreateFunction::Free => prompt.to_string(),
        CreateFunction::Sticker => format!(
            "{prompt}, simple, clean, vector art, die-cut sticker, white background, high contrast"
        ),
        CreateFunction::Text => format!(
            "A modern, minimalist logo with the text \"{prompt}\". Vector art, clean lines, suitable for a brand."
        ),
        CreateFunction::Comic => format!(
            "{prompt}, in a dynamic comic book art style, vibrant colors, bold outlines, action-packed scene."
        ),
    }
}

/// Instruction sent when two images are combined around a theme.
pub fn compose_instruction(theme: &str) -> String {
    format!("Combine these two images into one cohesive picture. The theme is: {theme}")
}
