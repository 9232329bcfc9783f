use thiserror::Error;

const MAX_SPRITE_KEY_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key is longer than {max} bytes")]
    TooLong { max: usize },
    #[error("sprite key must not start or end with '/'")]
    EdgeSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Sprite keys are asset-relative paths without extension, e.g. `maps/exterior`.
/// They resolve to `assets/sprites/<key>.png`.
pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.len() > MAX_SPRITE_KEY_LEN {
        return Err(SpriteKeyError::TooLong {
            max: MAX_SPRITE_KEY_LEN,
        });
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::EdgeSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}
