//! Form checks run before anything is sent to the backend.

use std::collections::BTreeMap;
use std::fmt;
use votesecure_types::RegistrationData;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    VoterId,
    AadharId,
    Phone,
    Email,
    Terms,
    OtpCode,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::VoterId => "voter_id",
            Field::AadharId => "aadhar_id",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Terms => "terms",
            Field::OtpCode => "otp_code",
        })
    }
}

pub const REQUIRED: &str = "Ce champ est obligatoire";

/// Every failing field with its message. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn check_voter_id(raw: &str) -> Result<String, &'static str> {
    let id = raw.trim();
    if id.is_empty() {
        Err(REQUIRED)
    } else if id.chars().count() < 8 {
        Err("L'ID électeur doit contenir au moins 8 caractères")
    } else {
        Ok(id.to_string())
    }
}

pub fn check_aadhar_id(raw: &str) -> Result<String, &'static str> {
    let id = strip_whitespace(raw);
    if id.is_empty() {
        Err(REQUIRED)
    } else if id.len() != 12 || !id.bytes().all(|b| b.is_ascii_digit()) {
        Err("L'ID Aadhar doit contenir 12 chiffres")
    } else {
        Ok(id)
    }
}

pub fn check_phone(raw: &str) -> Result<String, &'static str> {
    let phone = strip_whitespace(raw);
    if phone.is_empty() {
        return Err(REQUIRED);
    }
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '(' | ')');
    if phone.len() < 10 || !phone.chars().all(allowed) {
        Err("Numéro de téléphone invalide")
    } else {
        Ok(phone)
    }
}

/// `None` when the field was left blank.
pub fn check_email(raw: &str) -> Result<Option<String>, &'static str> {
    let email = raw.trim();
    if email.is_empty() {
        return Ok(None);
    }
    const INVALID: &str = "Adresse email invalide";
    if email.chars().any(char::is_whitespace) {
        return Err(INVALID);
    }
    let (local, domain) = email.split_once('@').ok_or(INVALID)?;
    if local.is_empty() || domain.contains('@') {
        return Err(INVALID);
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(Some(email.to_string())),
        _ => Err(INVALID),
    }
}

/// Exactly six ASCII digits.
pub fn check_otp(raw: &str) -> Result<String, ValidationErrors> {
    let code = raw.trim();
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(code.to_string());
    }
    let mut errors = ValidationErrors::default();
    errors.add(Field::OtpCode, "Veuillez saisir le code complet");
    Err(errors)
}

/// Validate the registration form, collecting every failing field.
pub fn validate_registration(
    voter_id: &str,
    aadhar_id: &str,
    phone: &str,
    email: &str,
    terms_accepted: bool,
) -> Result<RegistrationData, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let voter_id = check_voter_id(voter_id).map_err(|m| errors.add(Field::VoterId, m));
    let aadhar_id = check_aadhar_id(aadhar_id).map_err(|m| errors.add(Field::AadharId, m));
    let phone = check_phone(phone).map_err(|m| errors.add(Field::Phone, m));
    let email = check_email(email).map_err(|m| errors.add(Field::Email, m));
    if !terms_accepted {
        errors.add(Field::Terms, "Vous devez accepter les conditions");
    }

    match (voter_id, aadhar_id, phone, email) {
        (Ok(voter_id), Ok(aadhar_id), Ok(phone), Ok(email)) if errors.is_empty() => {
            Ok(RegistrationData {
                voter_id,
                aadhar_id,
                phone,
                email,
            })
        }
        _ => Err(errors),
    }
}

/// Validate login credentials; returns the normalized (voter id, Aadhar id).
pub fn validate_login(voter_id: &str, aadhar_id: &str) -> Result<(String, String), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let voter_id = check_voter_id(voter_id).map_err(|m| errors.add(Field::VoterId, m));
    let aadhar_id = check_aadhar_id(aadhar_id).map_err(|m| errors.add(Field::AadharId, m));
    match (voter_id, aadhar_id) {
        (Ok(v), Ok(a)) => Ok((v, a)),
        _ => Err(errors),
    }
}
