//! Prompt text sent to the image, video and text models.

pub const DEFAULT_TYPOGRAPHY_INSTRUCTION: &str = "Render the text in bold, highly legible \
lettering with an artistic treatment that matches the scene's materials, lighting and mood, \
as if it physically belongs in the environment.";

/// Curated styles used when a suggestion cannot be obtained.
pub const FALLBACK_STYLES: &[&str] = &[
    "Neon-drenched cyberpunk alley at night, rain-slick reflections",
    "Ancient stone carved into a misty mountain temple at dawn",
    "Molten gold forged in a dark blacksmith's workshop, flying sparks",
    "Bioluminescent coral reef deep underwater, soft caustic light",
    "Frozen ice sculpture in an arctic storm, cold blue backlight",
    "Overgrown jungle ruins with moss and god rays through the canopy",
    "Retro 1980s chrome on a synthwave sunset grid",
    "Smoke and embers swirling over a volcanic landscape",
];

pub fn style_suggestion_prompt(text: &str) -> String {
    format!(
        "Suggest one short, vivid cinematic visual style for a scene that reveals the text \
\"{}\". Answer with the style description only, at most 15 words, no quotes.",
        text
    )
}

pub fn image_prompt(text: &str, style: &str, typography: &str) -> String {
    let style = describe_style(style);
    format!(
        "A hyper-realistic, cinematic 16:9 scene {} containing the text \"{}\" as the \
central focal point. {} Dramatic lighting, rich detail, shallow depth of field.",
        style, text, typography
    )
}

pub fn image_prompt_with_reference(text: &str, style: &str, typography: &str) -> String {
    let style = describe_style(style);
    format!(
        "Use the provided image as a style reference. Emulate its visual style, color \
palette, lighting and texture, and create a new cinematic 16:9 scene {} with the text \"{}\" \
rendered clearly in the center of the frame. {}",
        style, text, typography
    )
}

pub fn video_prompt(text: &str, style: &str) -> String {
    let style = style.trim();
    let mut prompt = format!(
        "Cinematic reveal: starting from complete darkness, the text \"{}\" slowly \
materializes out of light and particles, the scene forming around it until it settles on \
the final frame.",
        text
    );
    if !style.is_empty() {
        prompt.push_str(&format!(" Visual style: {}.", style));
    }
    prompt
}

fn describe_style(style: &str) -> String {
    let style = style.trim();
    if style.is_empty() {
        "in a striking, atmospheric setting".to_string()
    } else {
        format!("in the style of {}", style)
    }
}
