//! Bullet normalization — every description bullet, model-written or
//! fallback-generated, leaves here in one canonical form: `"● text"`.

/// The single marker every bullet starts with (U+25CF BLACK CIRCLE).
pub const BULLET_MARKER: char = '●';

/// Glyphs that act as bullets when they appear at the start of a line.
const LEADING_BULLET_GLYPHS: &[char] = &[
    '●', '•', '▪', '◦', '‣', '∙', '■', '□', '○', '►', '▶', '➤', '-', '*', '–', '—', '%',
];

/// Bullet glyphs that must not survive anywhere in the text. The canonical
/// marker and plain punctuation (`-`, `*`) are deliberately absent.
const ALTERNATE_BULLET_GLYPHS: &[char] = &['•', '▪', '◦', '‣', '∙', '■', '□', '○', '►', '▶', '➤'];

/// Emoji presentation selectors (text and emoji variants).
const VARIATION_SELECTORS: &[char] = &['\u{FE0E}', '\u{FE0F}'];

/// Normalizes a single bullet.
///
/// Steps: drop variation selectors → strip the leading run of bullet glyphs and
/// stray `%Ï`/`%` tokens → blank out alternate glyphs elsewhere → collapse
/// whitespace → prefix with `"● "`. Content that is empty after stripping
/// yields a bare marker.
pub fn normalize_bullet(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !VARIATION_SELECTORS.contains(c))
        .collect();

    let body = strip_leading_markers(&cleaned);

    let body: String = body
        .chars()
        .map(|c| {
            if ALTERNATE_BULLET_GLYPHS.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();

    let body = body.split_whitespace().collect::<Vec<_>>().join(" ");

    if body.is_empty() {
        BULLET_MARKER.to_string()
    } else {
        format!("{BULLET_MARKER} {body}")
    }
}

/// Normalizes every bullet in order.
pub fn normalize_bullets(bullets: &[String]) -> Vec<String> {
    bullets.iter().map(|b| normalize_bullet(b)).collect()
}

/// True when a normalized bullet carries text beyond the marker.
pub fn has_content(normalized: &str) -> bool {
    normalized
        .strip_prefix(BULLET_MARKER)
        .is_some_and(|rest| !rest.trim().is_empty())
}

fn strip_leading_markers(text: &str) -> &str {
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("%Ï") {
            rest = after;
            continue;
        }
        match trimmed.chars().next() {
            Some(c) if LEADING_BULLET_GLYPHS.contains(&c) => {
                rest = &trimmed[c.len_utf8()..];
            }
            _ => return trimmed,
        }
    }
}
