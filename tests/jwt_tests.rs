use dreamnest_backend::util::jwt::*;
use dreamnest_backend::config::JwtConfig;
use dreamnest_backend::model::user::UserRole;
use bson::oid::ObjectId;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

fn utils_with_expiry(minutes: i64) -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig { expiration_minutes: minutes, ..JwtConfig::default() })
}

#[test]
fn test_generate_and_validate_token() {
    let jwt_utils = create_test_jwt_utils();
    let user_id = ObjectId::new();

    let token = jwt_utils.generate_token(&user_id, UserRole::User).unwrap();
    assert!(!token.is_empty());

    let claims = jwt_utils.validate_token(&token).unwrap();
    assert_eq!(claims.id, user_id.to_hex());
    assert_eq!(claims.role, UserRole::User);

    let caller = claims.caller().unwrap();
    assert_eq!(caller.id, user_id);
    assert!(!caller.is_admin());
}

#[test]
fn test_admin_role_survives_round_trip() {
    let jwt_utils = create_test_jwt_utils();
    let token = jwt_utils.generate_token(&ObjectId::new(), UserRole::Admin).unwrap();
    let caller = jwt_utils.validate_token(&token).unwrap().caller().unwrap();
    assert!(caller.is_admin());
}

#[test]
fn test_token_timestamps() {
    let jwt_utils = create_test_jwt_utils();
    let before = Utc::now().timestamp();
    let token = jwt_utils.generate_token(&ObjectId::new(), UserRole::User).unwrap();
    let claims = jwt_utils.validate_token(&token).unwrap();

    assert!(claims.iat >= before);
    assert_eq!(claims.exp - claims.iat, 1440 * 60);
}

#[test]
fn test_expired_token_is_reported_as_expired() {
    let jwt_utils = utils_with_expiry(-5);
    let token = jwt_utils.generate_token(&ObjectId::new(), UserRole::User).unwrap();

    assert!(matches!(jwt_utils.validate_token(&token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_validate_token_with_other_secret() {
    let issuer = create_test_jwt_utils();
    let other = JwtTokenUtilsImpl::new(JwtConfig {
        jwt_secret: "a-completely-different-secret-of-enough-length".to_string(),
        ..JwtConfig::default()
    });

    let token = issuer.generate_token(&ObjectId::new(), UserRole::Admin).unwrap();
    assert!(matches!(other.validate_token(&token), Err(JwtError::DecodingFailed(_))));
}

#[test]
fn test_tampered_token_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let token = jwt_utils.generate_token(&ObjectId::new(), UserRole::User).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let forged_claims = serde_json::json!({
        "id": ObjectId::new().to_hex(),
        "role": "admin",
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600,
        "jti": "forged",
    });
    let forged = encode(&Header::default(), &forged_claims, &EncodingKey::from_secret(b"guess")).unwrap();
    parts[1] = forged.split('.').nth(1).unwrap().to_string();

    assert!(jwt_utils.validate_token(&parts.join(".")).is_err());
}

#[test]
fn test_validate_malformed_token() {
    let jwt_utils = create_test_jwt_utils();
    for token in ["", "not-a-jwt", "a.b.c"] {
        assert!(jwt_utils.validate_token(token).is_err(), "accepted {:?}", token);
    }
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();

    assert_eq!(jwt_utils.extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    assert_eq!(jwt_utils.extract_token_from_header("Bearer   abc  ").unwrap(), "abc");
    assert!(matches!(jwt_utils.extract_token_from_header("Basic dXNlcjpwYXNz"), Err(JwtError::InvalidToken)));
    assert!(matches!(jwt_utils.extract_token_from_header("Bearer "), Err(JwtError::InvalidToken)));
    assert!(matches!(jwt_utils.extract_token_from_header("bearer abc"), Err(JwtError::InvalidToken)));
}

#[test]
fn test_claims_with_bad_id_have_no_caller() {
    let claims = Claims {
        id: "user123".to_string(),
        role: UserRole::User,
        iat: 0,
        exp: 0,
        jti: "x".to_string(),
    };
    assert!(claims.caller().is_err());
}

#[test]
fn test_jti_is_unique_per_token() {
    let jwt_utils = create_test_jwt_utils();
    let id = ObjectId::new();
    let a = jwt_utils.validate_token(&jwt_utils.generate_token(&id, UserRole::User).unwrap()).unwrap();
    let b = jwt_utils.validate_token(&jwt_utils.generate_token(&id, UserRole::User).unwrap()).unwrap();
    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_jwt_error_display() {
    assert_eq!(JwtError::TokenExpired.to_string(), "Token has expired");
    assert_eq!(JwtError::InvalidToken.to_string(), "Invalid token format");
    assert_eq!(
        JwtError::DecodingFailed("bad".to_string()).to_string(),
        "Failed to decode JWT token: bad"
    );
}
