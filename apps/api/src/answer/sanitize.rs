//! Model-output sanitizer. Pure and total: every input produces an
//! output, and applying it twice yields the same text.

/// Emoji ranges the UI renders; everything else non-ASCII is dropped.
const EMOTICONS: std::ops::RangeInclusive<u32> = 0x1F600..=0x1F64F;
const SYMBOLS_AND_PICTOGRAPHS: std::ops::RangeInclusive<u32> = 0x1F300..=0x1F5FF;

/// Drops characters outside ASCII and the whitelisted emoji ranges, then
/// strips bold-markup delimiters and trims surrounding whitespace.
///
/// The character filter MUST run first: dropping a disallowed character
/// that sits between two lone asterisks would otherwise reassemble a
/// fresh `**` after the delimiter pass.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| is_allowed(c))
        .collect::<String>()
        .replace("**", "")
        .trim()
        .to_string()
}

fn is_allowed(c: char) -> bool {
    let cp = c as u32;
    cp < 128 || EMOTICONS.contains(&cp) || SYMBOLS_AND_PICTOGRAPHS.contains(&cp)
}
