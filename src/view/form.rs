//! Form draft: what the user has typed so far.

use std::str::FromStr;

use crate::client::ValidationFailure;

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Message,
    Email,
    Country,
    Signature,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Message => "message",
            Field::Email => "email",
            Field::Country => "country",
            Field::Signature => "signature",
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "message" | "msg" => Ok(Field::Message),
            "email" => Ok(Field::Email),
            "country" => Ok(Field::Country),
            "signature" => Ok(Field::Signature),
            other => Err(format!("unknown field '{}'", other)),
        }
    }
}

/// User-entered values. Only `name` and `message` ever reach the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub name: String,
    pub message: String,
    pub email: String,
    pub country: String,
    pub signature: String,
}

impl FormDraft {
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Message => self.message = value,
            Field::Email => self.email = value,
            Field::Country => self.country = value,
            Field::Signature => self.signature = value,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Message => &self.message,
            Field::Email => &self.email,
            Field::Country => &self.country,
            Field::Signature => &self.signature,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Fields the active form variant requires.
    pub fn required_fields(extended: bool) -> &'static [Field] {
        if extended {
            &[
                Field::Name,
                Field::Email,
                Field::Country,
                Field::Message,
                Field::Signature,
            ]
        } else {
            &[Field::Name, Field::Message]
        }
    }

    /// All required fields non-blank.
    pub fn validate(&self, extended: bool) -> Result<(), ValidationFailure> {
        let missing: Vec<_> = Self::required_fields(extended)
            .iter()
            .filter(|f| self.get(**f).trim().is_empty())
            .map(|f| f.label())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_variant_needs_name_and_message() {
        let mut draft = FormDraft::default();
        assert_eq!(draft.validate(false).unwrap_err().missing, vec!["name", "message"]);

        draft.set(Field::Name, "Ana");
        draft.set(Field::Message, "Paz");
        assert!(draft.validate(false).is_ok());
    }

    #[test]
    fn test_extended_variant_needs_every_field() {
        let mut draft = FormDraft::default();
        draft.set(Field::Name, "Ana");
        draft.set(Field::Message, "Paz");
        let err = draft.validate(true).unwrap_err();
        assert_eq!(err.missing, vec!["email", "country", "signature"]);
    }

    #[test]
    fn test_clear() {
        let mut draft = FormDraft::default();
        draft.set(Field::Email, "ana@example.org");
        draft.clear();
        assert_eq!(draft, FormDraft::default());
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("Name".parse::<Field>().unwrap(), Field::Name);
        assert_eq!("msg".parse::<Field>().unwrap(), Field::Message);
        assert!("phone".parse::<Field>().is_err());
    }
}
