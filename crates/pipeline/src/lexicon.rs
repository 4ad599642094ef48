//! Word-level helpers shared by the form detector and the intent classifier.

/// Leading politeness phrases skipped before looking at the first real word
const FILLERS: &[&[&str]] = &[
    &["please"],
    &["kindly"],
    &["hey"],
    &["hi"],
    &["can", "you"],
    &["could", "you"],
    &["would", "you"],
    &["will", "you"],
    &["i", "want", "to"],
    &["i", "need", "to"],
    &["i'd", "like", "to"],
    &["help", "me", "to"],
];

/// Lower-case and collapse runs of whitespace to single spaces
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-cased words with surrounding punctuation removed
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Drop any number of leading filler phrases
pub fn strip_fillers(mut words: &[String]) -> &[String] {
    'outer: loop {
        for filler in FILLERS {
            if words.len() > filler.len() && words.iter().zip(filler.iter()).all(|(w, f)| w == f) {
                words = &words[filler.len()..];
                continue 'outer;
            }
        }
        return words;
    }
}

/// The word itself plus its likely singular forms
pub fn singular_forms(word: &str) -> Vec<String> {
    let mut forms = vec![word.to_string()];
    if let Some(stem) = word.strip_suffix("ies") {
        forms.push(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        forms.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('s') {
        forms.push(stem.to_string());
    }
    forms
}

/// True when `word` or one of its singular forms is in `set`
pub fn contains_word(set: &[&str], word: &str) -> bool {
    singular_forms(word).iter().any(|form| set.contains(&form.as_str()))
}
