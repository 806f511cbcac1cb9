// storefront/src/services/auth_claims.rs

use crate::errors::{AppError, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use paydesk::domain::UserId;
use serde_json::Value;

/// Who the bearer token says the shopper is.
///
/// The token is decoded without checking its signature: the backend verifies
/// it on every request, the CLI only needs the user id to scope order lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
  pub user_id: UserId,
  pub role: Option<String>,
}

impl AuthClaims {
  pub fn from_token(token: &str) -> Result<Self> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
      return Err(AppError::Auth("Empty token".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)
      .map_err(|e| AppError::Auth(format!("Malformed token: {}", e)))?;
    let claims = data.claims;

    let user_id = ["id", "userId", "sub"]
      .iter()
      .find_map(|name| claims.get(*name).and_then(numeric))
      .map(UserId)
      .ok_or_else(|| AppError::Auth("Token carries no numeric user id (id, userId or sub)".to_string()))?;

    Ok(Self {
      user_id,
      role: role_of(&claims),
    })
  }
}

fn numeric(value: &Value) -> Option<u64> {
  match value {
    Value::Number(n) => n.as_u64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
}

// Spring Security serialises authorities as `{"authority": "ROLE_X"}`.
fn role_of(claims: &Value) -> Option<String> {
  let as_role = |value: &Value| match value {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Object(map) => map.get("authority").and_then(Value::as_str).map(str::to_string),
    _ => None,
  };
  claims
    .get("role")
    .and_then(as_role)
    .or_else(|| claims.get("roles").and_then(|r| r.get(0)).and_then(as_role))
    .or_else(|| claims.get("authorities").and_then(|a| a.get(0)).and_then(as_role))
}
