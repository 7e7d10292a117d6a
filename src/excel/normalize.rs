//! Name normalization for instructors and group codes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Explicit subgroup notation: /1/, /2/, \1\, \2\ or a trailing " -1"/" -2".
/// Study-form markers (/у/, /г/) are deliberately not part of this pattern.
static EXPLICIT_SUBGROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[12]/|\\[12]\\|\s-[12]$").unwrap());

/// A group code starts with Cyrillic letters (including Kazakh ones)
/// followed by a dash and a two-digit number.
static GROUP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЯЁӘҒҚҢӨҰҮІа-яёәғқңөұүі]+-\d{2}").unwrap());

/// Leading capitals of a group code form its specialty prefix.
static SPECIALTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[А-ЯЁӘҒҚҢӨҰҮІA-Z]+").unwrap());

/// The two-digit number after the dash.
static GROUP_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\d+)").unwrap());

/// Academic prefixes stripped from instructor names, applied in order.
static INSTRUCTOR_PREFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^а\.о\.\s*",
        r"^а\.о\s+",
        r"^с\.п\.\.*\s*",
        r"^с\.п\s+",
        r"^доцент\s*",
        r"^д\.\s*",
        r"^асс\.проф\.\s*",
        r"^қ\.проф\.\s*",
        r"^проф\.\s*",
        r"^профессор\s*",
        r"^ст\.преп\.\s*",
        r"^преподаватель\s*",
        r"^п\.\s*",
        r"^о\.\s*",
        r"^prof\.\s*",
        r"^Dr\s+",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
    .collect()
});

/// Strip academic prefixes and collapse whitespace so that
/// "а.о. Шалаев Б.Б." and "а.о.Шалаев Б.Б." normalize to the same value.
pub fn normalize_instructor_name(name: &str) -> String {
    let mut cleaned = name.trim().to_string();
    for prefix in INSTRUCTOR_PREFIXES.iter() {
        cleaned = prefix.replace(&cleaned, "").into_owned();
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove explicit subgroup notation from a group name, keeping study-form
/// markers (/у/, /г/) intact.
pub fn normalize_group_name(group: &str) -> String {
    let name = group.trim();
    if name.is_empty() {
        return String::new();
    }
    EXPLICIT_SUBGROUP.replace_all(name, "").trim().to_string()
}

/// True if the group name carries explicit subgroup notation.
pub fn has_explicit_subgroup(group: &str) -> bool {
    EXPLICIT_SUBGROUP.is_match(group)
}

/// True if the string looks like a group code ("АРХ-21 О", "СТР-11/у/", …).
pub fn is_valid_group_code(group: &str) -> bool {
    GROUP_CODE.is_match(group.trim())
}

/// Study year from the group number: the first digit of the two-digit
/// number after the dash ("АРХ-21 О" is 2nd year). Defaults to 1 when the
/// number cannot be read.
pub fn parse_group_year(group: &str) -> u8 {
    let Some(caps) = GROUP_NUMBER.captures(group) else {
        return 1;
    };
    let Ok(number) = caps[1].parse::<u32>() else {
        return 1;
    };
    if (10..=59).contains(&number) {
        (number / 10) as u8
    } else {
        1
    }
}

/// Russian-medium groups carry /г/ or /р/ in their code; everything else
/// is Kazakh-medium.
pub fn is_russian_group(group: &str) -> bool {
    group.contains("/г/") || group.contains("/р/")
}

/// Specialty prefix of a group code ("АРХ-21 О" → "АРХ").
pub fn parse_specialty_code(group: &str) -> String {
    SPECIALTY
        .find(group.trim())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
