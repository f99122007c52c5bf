use crate::body::Body;
use crate::constants::*;

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LENGTH
        ));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(
            "Username can only contain letters, numbers, hyphens, and underscores".into(),
        );
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// A message needs either a non-empty body or at least one attachment.
pub fn validate_message_body(body: &Body, attachment_count: usize) -> Result<(), String> {
    if attachment_count > MAX_ATTACHMENTS_PER_MESSAGE {
        return Err(format!(
            "At most {} attachments per message",
            MAX_ATTACHMENTS_PER_MESSAGE
        ));
    }
    match body {
        Body::Plaintext(text) => {
            if text.trim().is_empty() && attachment_count == 0 {
                return Err("Message content is required".into());
            }
            if text.len() > MAX_MESSAGE_LENGTH {
                return Err("Message too long".into());
            }
        }
        Body::Encrypted(envelope) => {
            if envelope.cipher_text.is_empty() || envelope.iv.is_empty() {
                return Err("Encrypted message is missing ciphertext or iv".into());
            }
            // base64 can be ~1.33x original
            if envelope.cipher_text.len() > MAX_MESSAGE_LENGTH * 2 {
                return Err("Message too long".into());
            }
        }
    }
    Ok(())
}

pub fn validate_emoji(emoji: &str) -> Result<(), String> {
    if emoji.is_empty() {
        return Err("Emoji is required".into());
    }
    if emoji.len() > MAX_EMOJI_LENGTH {
        return Err("Emoji too long".into());
    }
    Ok(())
}
