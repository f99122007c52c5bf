use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire form of an encrypted message body.
///
/// This shape is a compatibility contract: consumers recognize an encrypted
/// body by this exact JSON object and treat anything else as plaintext.
///
/// ```json
/// {"encrypted": true, "cipherText": "<base64>", "iv": "<base64>"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub cipher_text: String,
    pub iv: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeWire {
    encrypted: bool,
    cipher_text: String,
    iv: String,
}

/// A message body, decided at construction time — never re-sniffed from a
/// raw string at read time.
///
/// Serializes as a bare JSON string (plaintext) or the envelope object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Plaintext(String),
    Encrypted(Envelope),
}

impl Body {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Body::Encrypted(_))
    }

    pub fn as_plaintext(&self) -> Option<&str> {
        match self {
            Body::Plaintext(text) => Some(text),
            Body::Encrypted(_) => None,
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Body::Plaintext(text) => serializer.serialize_str(text),
            Body::Encrypted(envelope) => EnvelopeWire {
                encrypted: true,
                cipher_text: envelope.cipher_text.clone(),
                iv: envelope.iv.clone(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(text) => Ok(Body::Plaintext(text)),
            serde_json::Value::Object(_) => {
                let wire: EnvelopeWire =
                    serde_json::from_value(value).map_err(D::Error::custom)?;
                if !wire.encrypted {
                    return Err(D::Error::custom(
                        "envelope object must set \"encrypted\": true",
                    ));
                }
                Ok(Body::Encrypted(Envelope {
                    cipher_text: wire.cipher_text,
                    iv: wire.iv,
                }))
            }
            _ => Err(D::Error::custom(
                "body must be a string or an encrypted envelope",
            )),
        }
    }
}
