// src/chat/postprocess.rs
// Cleanup applied to raw model output before it reaches the user

/// Greeting variants removed everywhere in the answer, in this order
pub const GREETING_VARIANTS: [&str; 4] = ["Dobrý den, ", "Dobrý den.", "Dobrý den!", "Dobrý den"];

/// Strip markdown asterisks and greetings, trim, capitalise the first character.
///
/// Greeting removal is case-sensitive and happens before capitalisation, so a
/// lowercase `dobrý den, ...` survives and comes out as `Dobrý den, ...`.
pub fn clean_answer(raw: &str) -> String {
    let mut answer = raw.replace('*', "");
    for greeting in GREETING_VARIANTS {
        answer = answer.replace(greeting, "");
    }
    capitalize_first(answer.trim())
}

/// Uppercase only the first character; the rest is untouched
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Approximate token count: whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_asterisks() {
        assert_eq!(clean_answer("**Tabulky** najdete v sekci *Hráči*."), "Tabulky najdete v sekci Hráči.");
    }

    #[test]
    fn test_removes_greeting_variants() {
        assert_eq!(clean_answer("Dobrý den, statistiky jsou v menu."), "Statistiky jsou v menu.");
        assert_eq!(clean_answer("Dobrý den. sekce Zápasy"), "Sekce Zápasy");
        assert_eq!(clean_answer("Dobrý den! koukněte do Videomap"), "Koukněte do Videomap");
        assert_eq!(clean_answer("Dobrý den\nzde je odkaz"), "Zde je odkaz");
    }

    #[test]
    fn test_greeting_removed_globally() {
        assert_eq!(
            clean_answer("Sekce Týmy. Dobrý den, a také Hráči. Dobrý den!"),
            "Sekce Týmy. a také Hráči."
        );
    }

    #[test]
    fn test_greeting_hidden_by_asterisks() {
        assert_eq!(clean_answer("**Dobrý den**, vítejte"), "Vítejte");
    }

    #[test]
    fn test_lowercase_greeting_is_kept_and_capitalised() {
        assert_eq!(clean_answer("dobrý den, x"), "Dobrý den, x");
    }

    #[test]
    fn test_capitalizes_only_first_character() {
        assert_eq!(clean_answer("  čtěte dál o PowerPlay  "), "Čtěte dál o PowerPlay");
        assert_eq!(clean_answer("a"), "A");
        assert_eq!(capitalize_first("ábc DEF"), "Ábc DEF");
    }

    #[test]
    fn test_empty_after_cleanup() {
        assert_eq!(clean_answer("Dobrý den!"), "");
        assert_eq!(clean_answer("***"), "");
        assert_eq!(clean_answer(""), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  Sekce  Hráči\nnajdete\tv menu "), 5);
        assert_eq!(word_count(""), 0);
    }
}
