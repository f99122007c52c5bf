use thiserror::Error;

/// Separator between the two participant ids in a canonical thread id.
/// Must never appear in a valid user id.
pub const THREAD_ID_SEPARATOR: char = ':';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadIdError {
    #[error("Cannot open a thread with yourself")]
    SelfThread,

    #[error("User id is empty")]
    EmptyUserId,

    #[error("User id contains a reserved character")]
    ReservedCharacter,

    #[error("Malformed thread id")]
    Malformed,
}

/// Canonical identifier for a two-party conversation.
///
/// The id is the two participant ids sorted lexicographically and joined
/// with [`THREAD_ID_SEPARATOR`], so both participants derive the same id
/// without coordination. This is the only place thread ids are constructed;
/// the store and routes pass `ThreadId` values around, never raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn derive(user_a: &str, user_b: &str) -> Result<Self, ThreadIdError> {
        validate_user_id(user_a)?;
        validate_user_id(user_b)?;
        if user_a == user_b {
            return Err(ThreadIdError::SelfThread);
        }

        let (first, second) = if user_a < user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        };

        Ok(Self(format!("{}{}{}", first, THREAD_ID_SEPARATOR, second)))
    }

    /// Re-validate a thread id received over the wire.
    pub fn parse(raw: &str) -> Result<Self, ThreadIdError> {
        let (first, second) = raw
            .split_once(THREAD_ID_SEPARATOR)
            .ok_or(ThreadIdError::Malformed)?;
        let derived = Self::derive(first, second)?;
        if derived.0 != raw {
            // second half contained the separator, or the halves were unsorted
            return Err(ThreadIdError::Malformed);
        }
        Ok(derived)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two participant ids, in canonical (sorted) order.
    pub fn participants(&self) -> (&str, &str) {
        // constructed via derive, so the split always succeeds
        self.0
            .split_once(THREAD_ID_SEPARATOR)
            .expect("thread id is always two ids joined by the separator")
    }

    /// The counterpart of `user_id`, or `None` if they are not a participant.
    pub fn other(&self, user_id: &str) -> Option<&str> {
        let (a, b) = self.participants();
        if user_id == a {
            Some(b)
        } else if user_id == b {
            Some(a)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.other(user_id).is_some()
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_user_id(id: &str) -> Result<(), ThreadIdError> {
    if id.is_empty() {
        return Err(ThreadIdError::EmptyUserId);
    }
    if id.contains(THREAD_ID_SEPARATOR) {
        return Err(ThreadIdError::ReservedCharacter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_commutative() {
        let ab = ThreadId::derive("alice", "bob").unwrap();
        let ba = ThreadId::derive("bob", "alice").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.as_str(), "alice:bob");
    }

    #[test]
    fn test_self_thread_rejected() {
        assert_eq!(
            ThreadId::derive("alice", "alice"),
            Err(ThreadIdError::SelfThread)
        );
    }

    #[test]
    fn test_empty_id_rejected() {
        assert_eq!(ThreadId::derive("", "bob"), Err(ThreadIdError::EmptyUserId));
        assert_eq!(ThreadId::derive("alice", ""), Err(ThreadIdError::EmptyUserId));
    }

    #[test]
    fn test_separator_in_id_rejected() {
        assert_eq!(
            ThreadId::derive("al:ice", "bob"),
            Err(ThreadIdError::ReservedCharacter)
        );
    }

    #[test]
    fn test_participants_roundtrip() {
        let id = ThreadId::derive("u2", "u1").unwrap();
        assert_eq!(id.participants(), ("u1", "u2"));
        assert_eq!(id.other("u1"), Some("u2"));
        assert_eq!(id.other("u2"), Some("u1"));
        assert_eq!(id.other("u3"), None);
    }

    #[test]
    fn test_parse_accepts_canonical_only() {
        assert!(ThreadId::parse("alice:bob").is_ok());
        // unsorted halves are not canonical
        assert_eq!(ThreadId::parse("bob:alice"), Err(ThreadIdError::Malformed));
        assert_eq!(ThreadId::parse("alicebob"), Err(ThreadIdError::Malformed));
        assert_eq!(ThreadId::parse("alice:alice"), Err(ThreadIdError::SelfThread));
        // an embedded separator cannot be mistaken for a valid pair
        assert!(ThreadId::parse("a:b:c").is_err());
    }

    #[test]
    fn test_distinct_pairs_never_collide() {
        let ids = ["u1", "u2", "u3", "u4"];
        let mut seen = std::collections::HashSet::new();
        for a in &ids {
            for b in &ids {
                if a != b {
                    seen.insert(ThreadId::derive(a, b).unwrap());
                }
            }
        }
        // 6 unordered pairs from 4 ids
        assert_eq!(seen.len(), 6);
    }
}
