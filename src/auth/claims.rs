use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload: the identity the client may display without a round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: Uuid,       // user ID
    pub name: String,   // display name at signing time
    pub avatar: String, // avatar URL at signing time
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}
