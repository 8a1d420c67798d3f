//! Friend personas.

mod friend;
mod templates;

pub use friend::{
    Friend, FriendProfile, Gender, AGE_MAX, AGE_MIN, BACKGROUND_MAX_CHARS, INTERESTS_MAX,
    NAME_MAX_CHARS, PERSONALITY_MAX_CHARS, PERSONALITY_MIN_CHARS, TRAITS_MAX, VOICE_MAX_CHARS,
};
pub use templates::{DefaultFriendTemplate, DEFAULT_FRIENDS};
