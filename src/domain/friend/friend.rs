//! Friend persona record and its validation rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{FriendId, OwnedByUser, Timestamp, UserId, ValidationError};

pub const NAME_MAX_CHARS: usize = 100;
pub const PERSONALITY_MIN_CHARS: usize = 10;
pub const PERSONALITY_MAX_CHARS: usize = 1000;
pub const AGE_MIN: u16 = 1;
pub const AGE_MAX: u16 = 150;
pub const TRAITS_MAX: usize = 10;
pub const VOICE_MAX_CHARS: usize = 50;
pub const BACKGROUND_MAX_CHARS: usize = 2000;
pub const INTERESTS_MAX: usize = 20;

/// Gender of a persona or a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
        }
    }

    /// Phrase used when describing the persona in prose.
    pub fn describe(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non-binary person",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "non_binary" => Ok(Gender::NonBinary),
            other => Err(ValidationError::invalid_format(
                "gender",
                format!("unknown gender '{}'", other),
            )),
        }
    }
}

/// Author-supplied persona fields, as accepted by friend creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendProfile {
    pub name: String,
    pub personality: String,
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl FriendProfile {
    /// Creates a profile with only the required fields set.
    pub fn new(name: impl Into<String>, personality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
            age: None,
            gender: None,
            traits: Vec::new(),
            voice: None,
            background: None,
            interests: Vec::new(),
            avatar: None,
        }
    }

    /// Checks every field against the persona limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            return Err(ValidationError::empty_field("name"));
        }
        check_max_chars("name", &self.name, NAME_MAX_CHARS)?;

        let personality_len = self.personality.trim().chars().count();
        if personality_len < PERSONALITY_MIN_CHARS {
            return Err(ValidationError::out_of_range(
                "personality",
                PERSONALITY_MIN_CHARS as i64,
                PERSONALITY_MAX_CHARS as i64,
                personality_len as i64,
            ));
        }
        check_max_chars("personality", &self.personality, PERSONALITY_MAX_CHARS)?;

        if let Some(age) = self.age {
            if !(AGE_MIN..=AGE_MAX).contains(&age) {
                return Err(ValidationError::out_of_range(
                    "age",
                    AGE_MIN as i64,
                    AGE_MAX as i64,
                    age as i64,
                ));
            }
        }

        if self.traits.len() > TRAITS_MAX {
            return Err(ValidationError::too_many("traits", TRAITS_MAX, self.traits.len()));
        }
        if self.interests.len() > INTERESTS_MAX {
            return Err(ValidationError::too_many(
                "interests",
                INTERESTS_MAX,
                self.interests.len(),
            ));
        }
        if let Some(voice) = &self.voice {
            check_max_chars("voice", voice, VOICE_MAX_CHARS)?;
        }
        if let Some(background) = &self.background {
            check_max_chars("background", background, BACKGROUND_MAX_CHARS)?;
        }
        if let Some(avatar) = &self.avatar {
            let looks_like_url = avatar.starts_with("https://")
                || avatar.starts_with("http://")
                || avatar.starts_with('/');
            if !looks_like_url {
                return Err(ValidationError::invalid_format(
                    "avatar",
                    "must be an http(s) URL or an absolute path",
                ));
            }
        }
        Ok(())
    }
}

fn check_max_chars(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

/// A persisted persona, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub user_id: UserId,
    pub name: String,
    pub personality: String,
    pub age: Option<u16>,
    pub gender: Option<Gender>,
    pub traits: Vec<String>,
    pub voice: Option<String>,
    pub background: Option<String>,
    pub interests: Vec<String>,
    pub avatar: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Friend {
    /// Validates the profile and builds a new friend for `user_id`.
    pub fn create(
        user_id: UserId,
        profile: FriendProfile,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        profile.validate()?;
        Ok(Self {
            id: FriendId::new(),
            user_id,
            name: profile.name.trim().to_string(),
            personality: profile.personality.trim().to_string(),
            age: profile.age,
            gender: profile.gender,
            traits: profile.traits,
            voice: profile.voice,
            background: profile.background,
            interests: profile.interests,
            avatar: profile.avatar,
            created_at: now,
            updated_at: now,
        })
    }

    /// Marks recent activity.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}

impl OwnedByUser for Friend {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}
