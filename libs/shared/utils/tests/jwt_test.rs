use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

#[test]
fn valid_token_yields_the_caller_identity() {
    let config = TestConfig::default();
    let user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    let validated = validate_token(&token, &config.jwt_secret).unwrap();
    assert_eq!(validated.id, user.id);
    assert_eq!(validated.email.as_deref(), Some("patient@example.com"));
    assert!(validated.is_patient());
}

#[test]
fn expired_token_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_expired_token(&user, &config.jwt_secret);

    let err = validate_token(&token, &config.jwt_secret).unwrap_err();
    assert!(err.contains("expired"));
}

#[test]
fn wrong_signature_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::doctor("doctor@example.com");
    let token = JwtTestUtils::create_invalid_signature_token(&user);

    assert!(validate_token(&token, &config.jwt_secret).is_err());
}

#[test]
fn malformed_tokens_and_missing_secret_are_rejected() {
    let config = TestConfig::default();

    assert!(validate_token(&JwtTestUtils::create_malformed_token(), &config.jwt_secret).is_err());
    assert!(validate_token("not-even-a-token", &config.jwt_secret).is_err());

    let user = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);
    assert!(validate_token(&token, "").is_err());
}
