//! Best-effort field extraction from free-text model answers
//!
//! The model is asked for labelled sections but nothing guarantees it
//! complies. Every field here is optional and a parse never fails; the raw
//! text is always kept alongside.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Damage severity as reported by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

const SEVERITY_TERMS: &[(&str, Severity)] = &[
    ("minor", Severity::Minor),
    ("moderate", Severity::Moderate),
    ("severe", Severity::Severe),
];

impl Severity {
    /// Reads an explicit `Severity: <term>` label, else the first severity term
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::labelled(&text).or_else(|| earliest_term(&text, SEVERITY_TERMS, true))
    }

    fn labelled(lower: &str) -> Option<Self> {
        labelled_term(lower, "severity", SEVERITY_TERMS)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "Minor",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

/// Expected effort of the repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairComplexity {
    Easy,
    Medium,
    Complex,
}

const COMPLEXITY_TERMS: &[(&str, RepairComplexity)] = &[
    ("easy", RepairComplexity::Easy),
    ("medium", RepairComplexity::Medium),
    ("complex", RepairComplexity::Complex),
];

impl RepairComplexity {
    /// Reads an explicit `Complexity: <term>` label, else the first complexity term
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        Self::labelled(&text).or_else(|| earliest_term(&text, COMPLEXITY_TERMS, true))
    }

    fn labelled(lower: &str) -> Option<Self> {
        labelled_term(lower, "complexity", COMPLEXITY_TERMS)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepairComplexity::Easy => "Easy",
            RepairComplexity::Medium => "Medium",
            RepairComplexity::Complex => "Complex",
        }
    }
}

/// Fields recovered from one model answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAssessment {
    /// Damage analysis section
    pub damage: Option<String>,
    /// Repair needs section
    pub repair: Option<String>,
    /// Consistency check section
    pub consistency: Option<String>,
    /// Where on the vehicle the damage is
    pub location: Option<String>,
    /// Kind of damage (dent, scratch, ...)
    pub damage_type: Option<String>,
    pub severity: Option<Severity>,
    pub repair_complexity: Option<RepairComplexity>,
    /// Parts likely needing replacement, comma separated
    pub replacement_parts: Option<String>,
    /// Areas to check for hidden damage
    pub inspection_areas: Option<String>,
    pub repair_time: Option<String>,
    /// Whether specialised tools or skills are needed
    pub specialized_requirements: Option<String>,
    pub safety_notes: Option<String>,
}

impl ParsedAssessment {
    pub fn is_empty(&self) -> bool {
        *self == ParsedAssessment::default()
    }
}

const DAMAGE_TYPES: &[(&str, &str)] = &[
    ("dent", "Dent"),
    ("scratch", "Scratch"),
    ("scrape", "Scrape"),
    ("crack", "Crack"),
    ("shatter", "Shattered glass"),
    ("broken", "Broken part"),
    ("puncture", "Puncture"),
    ("tear", "Tear"),
    ("crush", "Crush"),
    ("deform", "Deformation"),
    ("rust", "Rust"),
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Damage,
    Repair,
    Consistency,
}

/// Extracts whatever structure it can from a model answer
///
/// A JSON object anywhere in the text wins; otherwise the text is split on
/// `Damage:` / `Repair:` / `Consistency:` headings and scanned for keywords.
pub fn parse_assessment(text: &str) -> ParsedAssessment {
    let mut parsed = parse_json_object(text).unwrap_or_else(|| parse_sections(text));

    let damage_scope = parsed.damage.clone().unwrap_or_else(|| text.to_string());
    let repair_scope = parsed.repair.clone().unwrap_or_else(|| text.to_string());

    let lower = text.to_lowercase();
    if parsed.severity.is_none() {
        parsed.severity = Severity::labelled(&lower).or_else(|| Severity::from_text(&damage_scope));
    }
    if parsed.damage_type.is_none() {
        parsed.damage_type =
            earliest_term(&damage_scope.to_lowercase(), DAMAGE_TYPES, false).map(str::to_string);
    }
    if parsed.repair_complexity.is_none() {
        parsed.repair_complexity =
            RepairComplexity::labelled(&lower).or_else(|| RepairComplexity::from_text(&repair_scope));
    }

    let fill = |slot: &mut Option<String>, labels: &[&str]| {
        if slot.is_none() {
            *slot = labelled_line(text, labels);
        }
    };
    fill(&mut parsed.location, &["location", "damage location"]);
    fill(
        &mut parsed.replacement_parts,
        &["parts to replace", "replacement parts", "parts needing replacement"],
    );
    fill(
        &mut parsed.inspection_areas,
        &["inspection areas", "areas to inspect", "hidden damage"],
    );
    fill(&mut parsed.repair_time, &["repair time", "estimated repair time"]);
    fill(
        &mut parsed.specialized_requirements,
        &["specialized tools", "specialized requirements", "special requirements"],
    );
    fill(&mut parsed.safety_notes, &["safety", "safety notes", "safety considerations"]);

    parsed
}

fn parse_json_object(text: &str) -> Option<ParsedAssessment> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: Value = serde_json::from_str(&text[start..=end]).ok()?;
    let object = value.as_object()?;
    let field = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key).and_then(value_text))
    };

    Some(ParsedAssessment {
        damage: field(&["damage", "damage_assessment", "damage_analysis"]),
        repair: field(&[
            "repair",
            "repair_needs",
            "repair_recommendations",
            "repair_methods",
            "repair_parts",
        ]),
        consistency: field(&["consistency", "consistency_check"]),
        location: field(&["location", "damage_location"]),
        damage_type: field(&["type", "damage_type"]),
        severity: field(&["severity"]).and_then(|s| Severity::from_text(&s)),
        repair_complexity: field(&["repair_complexity", "complexity"])
            .and_then(|s| RepairComplexity::from_text(&s)),
        replacement_parts: field(&["replacement_parts", "parts_to_replace"]),
        inspection_areas: field(&["inspection_areas", "hidden_damage"]),
        repair_time: field(&["repair_time", "estimated_repair_time"]),
        specialized_requirements: ["specialized_requirements", "specialized_tools"]
            .iter()
            .find_map(|key| object.get(*key))
            .and_then(requirements_text),
        safety_notes: field(&["safety_considerations", "safety_notes", "safety"]),
    })
}

fn requirements_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("Requires specialized tools/skills".to_string()),
        Value::Bool(false) => Some("Standard repair".to_string()),
        other => value_text(other),
    }
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
        Value::Null => String::new(),
    };
    (!text.is_empty()).then_some(text)
}

fn parse_sections(text: &str) -> ParsedAssessment {
    let mut damage = Vec::new();
    let mut repair = Vec::new();
    let mut consistency = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let body = match section_heading(line) {
            Some((section, rest)) => {
                current = Some(section);
                rest
            }
            None => line.trim_end().to_string(),
        };

        let target = match current {
            Some(Section::Damage) => &mut damage,
            Some(Section::Repair) => &mut repair,
            Some(Section::Consistency) => &mut consistency,
            None => continue,
        };
        target.push(body);
    }

    ParsedAssessment {
        damage: join_section(damage),
        repair: join_section(repair),
        consistency: join_section(consistency),
        ..Default::default()
    }
}

/// Recognises `DAMAGE: ...`, `**Repair needs:**`, `## Consistency check`,
/// a bare `**DAMAGE**` line and numbered variants. Returns the section and
/// the text after the heading.
fn section_heading(line: &str) -> Option<(Section, String)> {
    let stripped = strip_marker(line);

    // Without a colon the whole line has to be the label.
    let (label, rest) = stripped.split_once(':').unwrap_or((stripped, ""));

    let label = label.trim_matches(is_emphasis).to_lowercase();
    let section = match label.as_str() {
        "damage" | "damage assessment" | "damage analysis" => Section::Damage,
        "repair" | "repairs" | "repair needs" | "repair recommendations" => Section::Repair,
        "consistency" | "consistency check" => Section::Consistency,
        _ => return None,
    };

    let rest = rest.trim_start_matches('*').trim().to_string();
    Some((section, rest))
}

/// Value of the first `Label: value` line whose label is one of `labels`
fn labelled_line(text: &str, labels: &[&str]) -> Option<String> {
    text.lines().find_map(|line| {
        let (label, value) = strip_marker(line).split_once(':')?;
        let label = label.trim_matches(is_emphasis).to_lowercase();
        if !labels.contains(&label.as_str()) {
            return None;
        }
        let value = value.trim_matches(is_emphasis);
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Drops list bullets, numbering and markdown emphasis from the start of a line
fn strip_marker(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '_' | '-') || c.is_ascii_digit())
        .trim_start_matches(['.', ')'])
        .trim()
}

fn is_emphasis(c: char) -> bool {
    matches!(c, '*' | '_' | '#') || c.is_whitespace()
}

/// Term right after `label` and a `:` or `-` separator, as in `Severity: Minor`
fn labelled_term<T: Copy>(haystack: &str, label: &str, terms: &[(&str, T)]) -> Option<T> {
    haystack.match_indices(label).find_map(|(i, _)| {
        let on_boundary = haystack[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        if !on_boundary {
            return None;
        }

        let after = &haystack[i + label.len()..];
        let value = after.trim_start_matches(|c: char| {
            matches!(c, ':' | '-' | '*' | '_') || c.is_whitespace()
        });
        let separator = &after[..after.len() - value.len()];
        if !separator.contains([':', '-']) {
            return None;
        }

        terms
            .iter()
            .find(|(term, _)| find_term(value, term, true) == Some(0))
            .map(|(_, found)| *found)
    })
}

fn join_section(lines: Vec<String>) -> Option<String> {
    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Returns the mapped value of whichever term occurs first in `haystack`
///
/// Terms must start on a word boundary; with `whole_word` they must also end on one.
fn earliest_term<T: Copy>(haystack: &str, terms: &[(&str, T)], whole_word: bool) -> Option<T> {
    terms
        .iter()
        .filter_map(|(term, value)| {
            find_term(haystack, term, whole_word).map(|position| (position, *value))
        })
        .min_by_key(|(position, _)| *position)
        .map(|(_, value)| value)
}

fn find_term(haystack: &str, term: &str, whole_word: bool) -> Option<usize> {
    haystack.match_indices(term).map(|(i, _)| i).find(|&i| {
        let before_ok = haystack[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = !whole_word
            || haystack[i + term.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_ignores_the_word_complexity() {
        let text = "Repair complexity: Medium";
        assert_eq!(RepairComplexity::from_text(text), Some(RepairComplexity::Medium));
    }

    #[test]
    fn test_damage_type_matches_inflections() {
        let found = earliest_term("the door is dented and scratched", DAMAGE_TYPES, false);
        assert_eq!(found, Some("Dent"));
    }

    #[test]
    fn test_heading_variants() {
        assert!(matches!(section_heading("DAMAGE: dent"), Some((Section::Damage, _))));
        assert!(matches!(section_heading("**Repair needs:** paint"), Some((Section::Repair, _))));
        assert!(matches!(section_heading("## Consistency check"), Some((Section::Consistency, _))));
        assert!(matches!(section_heading("3. Consistency: matches"), Some((Section::Consistency, _))));
        assert!(section_heading("Damage type: dent").is_none());
    }

    #[test]
    fn test_bare_and_bold_headings() {
        assert!(matches!(section_heading("**DAMAGE**"), Some((Section::Damage, _))));
        assert!(matches!(section_heading("REPAIR"), Some((Section::Repair, _))));
        assert!(matches!(section_heading("2. __Consistency check__"), Some((Section::Consistency, _))));
        assert!(section_heading("Damage to the rear door").is_none());
    }

    #[test]
    fn test_labelled_term_needs_a_separator() {
        assert_eq!(Severity::labelled("severity: minor"), Some(Severity::Minor));
        assert_eq!(Severity::labelled("**severity:** moderate"), Some(Severity::Moderate));
        assert_eq!(Severity::labelled("severity (minor/moderate/severe)"), None);
        assert_eq!(RepairComplexity::labelled("repair complexity - easy"), Some(RepairComplexity::Easy));
    }

    #[test]
    fn test_labelled_line_strips_emphasis() {
        let text = "REPAIR: bumper\n- **Repair time:** 2 days\n";
        assert_eq!(labelled_line(text, &["repair time"]), Some("2 days".to_string()));
        assert_eq!(labelled_line(text, &["safety"]), None);
    }
}
