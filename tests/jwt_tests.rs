use doctor_feedback_backend::config::JwtConfig;
use doctor_feedback_backend::util::jwt::*;

// Helper function to create JWT utils for testing
fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

const USER_ID: &str = "6f1c2d3e-0000-4000-8000-000000000001";

#[test]
fn test_generate_session_token_success() {
    let jwt_utils = create_test_jwt_utils();
    let session = jwt_utils.generate_session_token(USER_ID, "dr_amina").unwrap();

    assert_eq!(session.token.split('.').count(), 3);
    assert_eq!(session.claims.sub, USER_ID);
    assert_eq!(session.claims.username, "dr_amina");
    assert_eq!(session.claims.exp - session.claims.iat, jwt_utils.jwt_config.session_expiration_secs());
    assert_eq!(session.claims.iss.as_deref(), Some("doctor-feedback-backend-test"));
}

#[test]
fn test_each_session_gets_its_own_jti() {
    let jwt_utils = create_test_jwt_utils();
    let first = jwt_utils.generate_session_token(USER_ID, "dr_amina").unwrap();
    let second = jwt_utils.generate_session_token(USER_ID, "dr_amina").unwrap();
    assert_ne!(first.claims.jti, second.claims.jti);
}

#[test]
fn test_validate_session_token_round_trip() {
    let jwt_utils = create_test_jwt_utils();
    let session = jwt_utils.generate_session_token(USER_ID, "dr_amina").unwrap();

    let claims = jwt_utils.validate_session_token(&session.token).unwrap();
    assert_eq!(claims.sub, USER_ID);
    assert_eq!(claims.jti, session.claims.jti);
    assert!(claims.remaining_secs() > 0);
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let mut other_config = JwtConfig::default();
    other_config.jwt_secret = "another_secret_key_that_is_also_long_enough_to_pass".to_string();
    let other = JwtTokenUtilsImpl::new(other_config);

    let session = other.generate_session_token(USER_ID, "dr_amina").unwrap();
    assert!(matches!(
        jwt_utils.validate_session_token(&session.token),
        Err(JwtError::DecodingFailed(_))
    ));
}

#[test]
fn test_token_with_wrong_issuer_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    let mut other_config = JwtConfig::default();
    other_config.jwt_issuer = Some("someone-else".to_string());
    let other = JwtTokenUtilsImpl::new(other_config);

    let session = other.generate_session_token(USER_ID, "dr_amina").unwrap();
    assert!(jwt_utils.validate_session_token(&session.token).is_err());
}

#[test]
fn test_expired_token_is_rejected() {
    let mut config = JwtConfig::default();
    config.session_expiration = -1;
    let jwt_utils = JwtTokenUtilsImpl::new(config);

    let session = jwt_utils.generate_session_token(USER_ID, "dr_amina").unwrap();
    assert_eq!(session.claims.remaining_secs(), 0);
    assert!(matches!(
        jwt_utils.validate_session_token(&session.token),
        Err(JwtError::TokenExpired)
    ));
}

#[test]
fn test_garbage_token_is_rejected() {
    let jwt_utils = create_test_jwt_utils();
    assert!(jwt_utils.validate_session_token("not.a.token").is_err());
    assert!(jwt_utils.validate_session_token("").is_err());
}

#[test]
fn test_extract_token_from_header() {
    let jwt_utils = create_test_jwt_utils();
    assert_eq!(jwt_utils.extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    assert!(matches!(
        jwt_utils.extract_token_from_header("Basic dXNlcjpwYXNz"),
        Err(JwtError::InvalidToken)
    ));
    assert!(jwt_utils.extract_token_from_header("Bearer   ").is_err());
}
