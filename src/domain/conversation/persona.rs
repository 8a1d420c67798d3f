//! System instruction synthesized from a friend's persona.

use std::fmt::Write;

use crate::domain::friend::Friend;
use crate::domain::user::UserAccount;

const TRAITS_FALLBACK: &str = "unique and engaging";
const INTERESTS_FALLBACK: &str = "a variety of topics";
const VOICE_FALLBACK: &str = "natural";

/// Stylistic rules appended to every persona prompt.
const OUTPUT_RULES: &[&str] = &[
    "Reply in plain text only. No Markdown, lists, headings, or bold text.",
    "Keep it conversational, the way you would text a close friend. Contractions and small talk are fine.",
    "Do not open with a greeting like \"Hi\" or \"Hello\" unless the moment calls for it.",
    "Do not lecture, summarize, or hand out structured advice.",
    "Never describe yourself as an assistant, an AI, or a chatbot.",
    "Use direct language and skip flowery phrasing.",
];

/// Builds the system instruction for a conversation with `friend`.
///
/// Missing optional fields fall back to neutral text so the prompt is
/// always well formed, even for a brand-new persona.
pub fn system_prompt(friend: &Friend, user: &UserAccount) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "You are {}. {}", friend.name, friend.personality.trim());

    if let Some(note) = gender_note(friend, user) {
        let _ = write!(prompt, "\nGender:\n{}\n", note);
    }

    if let Some(background) = friend.background.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = write!(prompt, "\nYour background:\n{}\n", background.trim());
    }

    let traits = if friend.traits.is_empty() {
        TRAITS_FALLBACK.to_string()
    } else {
        format!("{}, {}", friend.traits.join(", "), TRAITS_FALLBACK)
    };
    let _ = write!(prompt, "\nPersonality traits:\n{}.\n", traits);

    let voice = friend
        .voice
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(VOICE_FALLBACK);
    let _ = write!(prompt, "\nSpeaking style:\n{}.\n", voice);

    if let Some(age) = friend.age {
        let _ = write!(prompt, "\nAge:\nYou are {} years old.\n", age);
    }

    let interests = if friend.interests.is_empty() {
        INTERESTS_FALLBACK.to_string()
    } else {
        friend.interests.join(", ")
    };
    let _ = write!(prompt, "\nInterests:\nYou enjoy talking about {}.\n", interests);

    let _ = write!(prompt, "\nOutput rules:\n- Always respond as {}.\n", friend.name);
    for rule in OUTPUT_RULES {
        let _ = writeln!(prompt, "- {}", rule);
    }

    prompt.trim_end().to_string()
}

fn gender_note(friend: &Friend, user: &UserAccount) -> Option<String> {
    match (friend.gender, user.gender) {
        (Some(own), Some(theirs)) => Some(format!(
            "You are {}. The user is {}.",
            with_article(own.describe()),
            with_article(theirs.describe())
        )),
        (Some(own), None) => Some(format!("You are {}.", with_article(own.describe()))),
        (None, Some(theirs)) => Some(format!("The user is {}.", with_article(theirs.describe()))),
        (None, None) => None,
    }
}

fn with_article(noun: &str) -> String {
    format!("a {}", noun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::friend::{FriendProfile, Gender};
    use crate::domain::quota::QuotaPolicy;

    fn user() -> UserAccount {
        UserAccount::provision(
            UserId::new("user-1").unwrap(),
            None,
            Timestamp::now(),
            &QuotaPolicy::default(),
        )
    }

    fn bare_friend() -> Friend {
        Friend::create(
            UserId::new("user-1").unwrap(),
            FriendProfile::new("Kai", "A laid-back surfer who loves the ocean."),
            Timestamp::now(),
        )
        .unwrap()
    }

    #[test]
    fn bare_persona_uses_fallbacks() {
        let prompt = system_prompt(&bare_friend(), &user());

        assert!(prompt.starts_with("You are Kai. A laid-back surfer"));
        assert!(prompt.contains("unique and engaging."));
        assert!(prompt.contains("a variety of topics"));
        assert!(prompt.contains("Speaking style:\nnatural."));
        assert!(!prompt.contains("Age:"));
        assert!(!prompt.contains("Gender:"));
    }

    #[test]
    fn full_persona_includes_every_field() {
        let mut friend = bare_friend();
        friend.traits = vec!["calm".into(), "witty".into()];
        friend.interests = vec!["surfing".into(), "tides".into()];
        friend.voice = Some("relaxed".into());
        friend.age = Some(30);
        friend.background = Some("Grew up on the coast.".into());
        friend.gender = Some(Gender::Male);

        let mut account = user();
        account.gender = Some(Gender::Female);

        let prompt = system_prompt(&friend, &account);
        assert!(prompt.contains("calm, witty, unique and engaging."));
        assert!(prompt.contains("You enjoy talking about surfing, tides."));
        assert!(prompt.contains("relaxed."));
        assert!(prompt.contains("You are 30 years old."));
        assert!(prompt.contains("Grew up on the coast."));
        assert!(prompt.contains("You are a male. The user is a female."));
    }

    #[test]
    fn output_rules_forbid_markdown_and_ai_disclosure() {
        let prompt = system_prompt(&bare_friend(), &user());
        assert!(prompt.contains("No Markdown"));
        assert!(prompt.contains("Never describe yourself as an assistant, an AI"));
        assert!(prompt.contains("Do not open with a greeting"));
    }

    #[test]
    fn friend_name_rule_appears_once() {
        let prompt = system_prompt(&bare_friend(), &user());
        assert_eq!(prompt.matches("Always respond as Kai.").count(), 1);
        assert_eq!(prompt.matches("- ").count(), OUTPUT_RULES.len() + 1);
    }
}
