use chrono::{DateTime, Utc};

const SLUG_SUFFIX_LENGTH: usize = 4;

/// Derives a URL-friendly slug from free text.
///
/// `"Inteligência Artificial na Medicina"` becomes `"inteligencia-artificial-na-medicina"`.
pub fn generate_slug(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(fold_diacritic)
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    for ch in folded.trim().chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => ch,
            '-' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// Slug for a newly created resource: the title slug plus a short time-derived suffix.
pub fn unique_slug(title: &str, now: DateTime<Utc>) -> String {
    let token = timestamp_token(now);
    let suffix_start = token.len().saturating_sub(SLUG_SUFFIX_LENGTH);
    format!("{}-{}", generate_slug(title), &token[suffix_start..])
}

/// Milliseconds since the epoch in base 36.
pub fn timestamp_token(now: DateTime<Utc>) -> String {
    to_base36(now.timestamp_millis().max(0) as u64)
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

pub(crate) fn fold_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        other => other,
    }
}
