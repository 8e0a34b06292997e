//! Media directive parsing and image URL derivation

/// In-band marker an assistant reply uses to request an image render
pub const MEDIA_MARKER: &str = "GEN_IMG:";

/// Image host serving prompt-derived renders
pub const IMAGE_HOST: &str = "https://image.pollinations.ai";

const IMAGE_WIDTH: u32 = 1024;
const IMAGE_HEIGHT: u32 = 1024;
const IMAGE_MODEL: &str = "flux";
const SEED_RANGE: u32 = 1_000_000;

/// A derived image reference: the prompt and a URL that renders it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub prompt: String,
    pub url: String,
}

/// Parse reply text for a media directive.
///
/// The prompt is everything after the FIRST marker occurrence, trimmed;
/// later occurrences stay inside the prompt verbatim.
pub fn parse(content: &str) -> Option<ImageRef> {
    let (_, rest) = content.split_once(MEDIA_MARKER)?;
    let prompt = rest.trim();
    Some(ImageRef {
        prompt: prompt.to_string(),
        url: image_url(prompt),
    })
}

/// Derive the image URL for a prompt.
///
/// The seed is drawn fresh on every call and never persisted, so deriving
/// the same message twice points at a different render.
pub fn image_url(prompt: &str) -> String {
    format!(
        "{IMAGE_HOST}/prompt/{}?width={IMAGE_WIDTH}&height={IMAGE_HEIGHT}&nologo=true&model={IMAGE_MODEL}&seed={}",
        urlencoding::encode(prompt),
        random_seed(),
    )
}

/// Visible text for a reply: only the first literal marker substring is
/// removed. The prompt and any surrounding narration stay in the bubble;
/// this is a deliberately narrow transform, not prose extraction.
pub fn display_text(content: &str) -> String {
    if content.contains(MEDIA_MARKER) {
        content.replacen(MEDIA_MARKER, "", 1).trim().to_string()
    } else {
        content.to_string()
    }
}

fn random_seed() -> u32 {
    let mut buf = [0u8; 4];
    if getrandom::fill(&mut buf).is_err() {
        return 0;
    }
    u32::from_le_bytes(buf) % SEED_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_yields_nothing() {
        assert_eq!(parse("just a normal reply"), None);
        assert_eq!(display_text("just a normal reply"), "just a normal reply");
    }

    #[test]
    fn test_no_marker_preserves_text_exactly() {
        let content = "  spaced out reply  ";
        assert_eq!(display_text(content), content);
    }

    #[test]
    fn test_prompt_extraction_and_display() {
        let content = "Here: GEN_IMG: a red fox";
        let image = parse(content).unwrap();
        assert_eq!(image.prompt, "a red fox");
        // Only the marker substring goes away; the prose around it stays
        assert_eq!(display_text(content), "Here:  a red fox");
    }

    #[test]
    fn test_marker_at_start() {
        let image = parse("GEN_IMG: neon city skyline").unwrap();
        assert_eq!(image.prompt, "neon city skyline");
        assert_eq!(display_text("GEN_IMG: neon city skyline"), "neon city skyline");
    }

    #[test]
    fn test_second_marker_stays_in_prompt() {
        let image = parse("GEN_IMG: first GEN_IMG: second").unwrap();
        assert_eq!(image.prompt, "first GEN_IMG: second");
        // Display removes only the first occurrence
        assert_eq!(display_text("GEN_IMG: first GEN_IMG: second"), "first GEN_IMG: second");
    }

    #[test]
    fn test_empty_prompt_still_parses() {
        let image = parse("GEN_IMG:").unwrap();
        assert_eq!(image.prompt, "");
        assert_eq!(display_text("GEN_IMG:"), "");
    }

    #[test]
    fn test_url_shape() {
        let image = parse("GEN_IMG: a red fox").unwrap();
        assert!(image.url.starts_with("https://image.pollinations.ai/prompt/a%20red%20fox?"));
        assert!(image.url.contains("width=1024"));
        assert!(image.url.contains("height=1024"));
        assert!(image.url.contains("nologo=true"));
        assert!(image.url.contains("model=flux"));
        assert!(image.url.contains("seed="));
    }

    #[test]
    fn test_url_escapes_reserved_characters() {
        let url = image_url("fox & friends?");
        assert!(url.contains("/prompt/fox%20%26%20friends%3F?"));
    }

    #[test]
    fn test_seed_stays_in_range() {
        for _ in 0..64 {
            let url = image_url("fox");
            let seed: u32 = url
                .rsplit("seed=")
                .next()
                .and_then(|s| s.parse().ok())
                .expect("seed should be numeric");
            assert!(seed < SEED_RANGE);
        }
    }
}
