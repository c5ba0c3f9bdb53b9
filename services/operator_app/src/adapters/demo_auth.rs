//! services/operator_app/src/adapters/demo_auth.rs
//!
//! The demo authentication provider. It stands in for the fleet backend: one
//! fixed operator account, JWT-shaped tokens, and a fixed simulated latency.
//! Swapping in a real backend means implementing `AuthProvider` elsewhere; the
//! session logic does not change.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use spio_core::domain::{
    AuthGrant, Credentials, OperatorGamification, OperatorLevel, OperatorProfile, OperatorRole,
    OperatorStatus,
};
use spio_core::ports::{AuthProvider, PortError, PortResult};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::Config;

/// Employee number of the demo operator.
pub const DEMO_USERNAME: &str = "TC-2024-0142";
/// Password accepted for the demo operator.
pub const DEMO_PASSWORD: &str = "Demo123!";

const DEMO_OPERATOR_ID: Uuid = Uuid::from_u128(0xa1b2c3d4_e5f6_7890_abcd_ef1234567890);
const DEMO_SIGNATURE: &str = "mock-signature-transportes-cuauhtemoc";

//=========================================================================================
// Token Claims
//=========================================================================================

#[derive(Serialize)]
struct TokenHeader<'a> {
    alg: &'a str,
    typ: &'a str,
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    sub: Uuid,
    emp: &'a str,
    name: &'a str,
    role: OperatorRole,
    iat: i64,
    exp: i64,
    jti: Uuid,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AuthProvider` port with a single demo account.
pub struct DemoAuthProvider {
    password_hash: String,
    login_delay: Duration,
    logout_delay: Duration,
    token_ttl: chrono::Duration,
}

impl DemoAuthProvider {
    /// Creates a new `DemoAuthProvider`, hashing the demo password up front.
    pub fn new(
        login_delay: Duration,
        logout_delay: Duration,
        token_ttl: chrono::Duration,
    ) -> PortResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash demo password: {:?}", e);
                PortError::Unexpected("Failed to hash demo password".to_string())
            })?
            .to_string();

        Ok(Self {
            password_hash,
            login_delay,
            logout_delay,
            token_ttl,
        })
    }

    pub fn from_config(config: &Config) -> PortResult<Self> {
        Self::new(config.login_delay, config.logout_delay, config.session_ttl)
    }

    /// The credential pair this provider accepts. Development use only.
    pub fn demo_credentials() -> Credentials {
        Credentials::new(DEMO_USERNAME, DEMO_PASSWORD)
    }

    fn verify(&self, credentials: &Credentials) -> PortResult<bool> {
        if credentials.username != DEMO_USERNAME {
            return Ok(false);
        }
        let parsed_hash = PasswordHash::new(&self.password_hash).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Authentication error".to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(credentials.password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn issue_token(&self, operator: &OperatorProfile, issued_at: DateTime<Utc>) -> PortResult<String> {
        let header = TokenHeader {
            alg: "HS256",
            typ: "JWT",
        };
        let claims = TokenClaims {
            sub: operator.id,
            emp: &operator.employee_number,
            name: &operator.full_name,
            role: operator.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.token_ttl).timestamp(),
            jti: Uuid::new_v4(),
        };

        let header = serde_json::to_vec(&header).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let claims = serde_json::to_vec(&claims).map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims),
            URL_SAFE_NO_PAD.encode(DEMO_SIGNATURE)
        ))
    }
}

//=========================================================================================
// `AuthProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthProvider for DemoAuthProvider {
    async fn authenticate(&self, credentials: &Credentials) -> PortResult<AuthGrant> {
        // Rejections pay the same latency as successes.
        tokio::time::sleep(self.login_delay).await;

        if !self.verify(credentials)? {
            debug!(username = %credentials.username, "Demo login rejected");
            return Err(PortError::InvalidCredentials);
        }

        let now = Utc::now();
        let mut operator = demo_operator();
        operator.last_login_at = Some(now);

        let access_token = self.issue_token(&operator, now)?;
        let refresh_token = self.issue_token(&operator, now)?;
        info!(employee_number = %operator.employee_number, "Demo login accepted");

        Ok(AuthGrant {
            access_token,
            refresh_token: Some(refresh_token),
            expires_at: Some(now + self.token_ttl),
            operator,
        })
    }

    async fn revoke(&self, _access_token: &str) -> PortResult<()> {
        tokio::time::sleep(self.logout_delay).await;
        debug!("Demo token revoked");
        Ok(())
    }
}

//=========================================================================================
// Fixture
//=========================================================================================

/// The operator behind the demo account.
pub fn demo_operator() -> OperatorProfile {
    let level = OperatorLevel::Gold;
    OperatorProfile {
        id: DEMO_OPERATOR_ID,
        employee_number: DEMO_USERNAME.to_string(),
        full_name: "Jorge Arturo Ramírez González".to_string(),
        first_name: "Jorge".to_string(),
        last_name: "Ramírez".to_string(),
        mother_last_name: Some("González".to_string()),
        email: "jorge.ramirez@transportescuauhtemoc.com".to_string(),
        phone: Some("+52 55 1234 5678".to_string()),
        avatar_url: Some("assets/images/avatars/default-avatar.svg".to_string()),
        role: OperatorRole::Operator,
        status: OperatorStatus::Active,
        gamification: OperatorGamification {
            total_points: 15_750,
            available_points: 8_500,
            level,
            level_name: level.display_name().to_string(),
            progress_to_next_level: 65,
            points_to_next_level: 4_250,
            total_kilometers: 125_840,
            ranking: Some(12),
        },
        hire_date: fixed_instant(2019, 3, 15, 0, 0),
        last_login_at: Some(fixed_instant(2026, 2, 3, 14, 30)),
        created_at: fixed_instant(2019, 3, 15, 10, 0),
        updated_at: fixed_instant(2026, 2, 3, 14, 30),
    }
}

fn fixed_instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> DemoAuthProvider {
        DemoAuthProvider::new(Duration::ZERO, Duration::ZERO, chrono::Duration::hours(24)).unwrap()
    }

    fn decode_claims(token: &str) -> serde_json::Value {
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let bytes = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn accepts_demo_credentials() {
        let grant = provider()
            .authenticate(&DemoAuthProvider::demo_credentials())
            .await
            .unwrap();

        assert_eq!(grant.operator.employee_number, DEMO_USERNAME);
        assert!(grant.refresh_token.is_some());
        assert_ne!(grant.refresh_token.as_deref(), Some(grant.access_token.as_str()));
        assert!(grant.expires_at.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn token_claims_identify_the_operator() {
        let grant = provider()
            .authenticate(&DemoAuthProvider::demo_credentials())
            .await
            .unwrap();

        let claims = decode_claims(&grant.access_token);
        assert_eq!(claims["emp"], DEMO_USERNAME);
        assert_eq!(claims["sub"], DEMO_OPERATOR_ID.to_string());
        assert_eq!(claims["role"], "OPERATOR");
        let lifetime = claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap();
        assert_eq!(lifetime, 24 * 60 * 60);
    }

    #[tokio::test]
    async fn rejects_wrong_password_and_unknown_user() {
        let provider = provider();
        for (user, pass) in [
            (DEMO_USERNAME, "wrong"),
            (DEMO_USERNAME, ""),
            ("TC-2024-0143", DEMO_PASSWORD),
            ("", ""),
        ] {
            let err = provider
                .authenticate(&Credentials::new(user, pass))
                .await
                .unwrap_err();
            assert_eq!(err, PortError::InvalidCredentials);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn login_takes_the_configured_delay() {
        let provider =
            DemoAuthProvider::new(Duration::from_millis(800), Duration::ZERO, chrono::Duration::hours(1))
                .unwrap();
        let started = tokio::time::Instant::now();
        let _ = provider.authenticate(&Credentials::new("x", "y")).await;
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[test]
    fn demo_operator_is_gold() {
        let operator = demo_operator();
        assert_eq!(operator.gamification.level, OperatorLevel::Gold);
        assert_eq!(operator.gamification.level_name, "Piloto Oro");
        assert_eq!(operator.first_name, "Jorge");
    }
}
