//! The fixed set of keys a session store holds.

use std::fmt;

/// A session store key.
///
/// The string forms are the storage keys themselves and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Token issued by `/api/auth/login`, used by later login steps and ballot calls.
    SessionToken,
    /// Phone number the login OTP was sent to.
    LoginPhoneNumber,
    /// Electeur id issued by `/api/auth/register`.
    RegistrationElecteurId,
    /// Phone number the registration OTP was sent to.
    RegistrationPhoneNumber,
    /// Bearer token stored once login completes.
    AuthBearerToken,
    /// JSON `CurrentUser` record written when login completes.
    CurrentUser,
    /// JSON vote record written after a successful vote.
    VoteRecord,
    /// JSON copy of the registration form.
    RegistrationData,
}

impl SessionKey {
    pub const ALL: [SessionKey; 8] = [
        SessionKey::SessionToken,
        SessionKey::LoginPhoneNumber,
        SessionKey::RegistrationElecteurId,
        SessionKey::RegistrationPhoneNumber,
        SessionKey::AuthBearerToken,
        SessionKey::CurrentUser,
        SessionKey::VoteRecord,
        SessionKey::RegistrationData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::SessionToken => "session_token",
            SessionKey::LoginPhoneNumber => "login_phone_number",
            SessionKey::RegistrationElecteurId => "registration_electeur_id",
            SessionKey::RegistrationPhoneNumber => "registration_phone_number",
            SessionKey::AuthBearerToken => "auth_bearer_token",
            SessionKey::CurrentUser => "currentUser",
            SessionKey::VoteRecord => "voteRecord",
            SessionKey::RegistrationData => "registrationData",
        }
    }

    pub fn from_str_key(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Whether the value is a credential that must not be printed.
    pub fn is_secret(&self) -> bool {
        matches!(self, SessionKey::SessionToken | SessionKey::AuthBearerToken)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
