use doctor_feedback_backend::util::password::*;

#[test]
fn test_hash_password_success() {
    let password = "Stethoscope-42!";
    let hash = PasswordUtilsImpl::hash_password(password).unwrap();

    // Hash should not equal the original password
    assert_ne!(hash, password);
    // Hash should be in Argon2id PHC format
    assert!(hash.starts_with("$argon2id$"));
}

#[test]
fn test_same_password_hashes_differently() {
    let first = PasswordUtilsImpl::hash_password("Stethoscope-42!").unwrap();
    let second = PasswordUtilsImpl::hash_password("Stethoscope-42!").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_verify_password() {
    let hash = PasswordUtilsImpl::hash_password("Stethoscope-42!").unwrap();
    assert!(PasswordUtilsImpl::verify_password("Stethoscope-42!", &hash).unwrap());
    assert!(!PasswordUtilsImpl::verify_password("stethoscope-42!", &hash).unwrap());
}

#[test]
fn test_verify_with_malformed_hash() {
    assert!(PasswordUtilsImpl::verify_password("anything", "not-a-phc-string").is_err());
}

#[test]
fn test_strength_rules() {
    let cases: Vec<(&str, &str, bool)> = vec![
        ("Stethoscope-42!", "dr_amina", true),
        ("Short1!", "dr_amina", false),
        ("9876543210123", "dr_amina", false),
        ("password123", "dr_amina", false),
        ("dr_amina_2024", "dr_amina", false),
        ("correct horse battery", "dr_amina", true),
    ];
    for (password, username, ok) in cases {
        assert_eq!(
            PasswordUtilsImpl::validate_password_strength(password, username).is_ok(),
            ok,
            "unexpected strength result for {:?}",
            password
        );
    }
}

#[test]
fn test_strength_reports_every_broken_rule() {
    let messages = PasswordUtilsImpl::validate_password_strength("1234567", "dr_amina").unwrap_err();
    assert!(messages.contains(&format!(
        "This password is too short. It must contain at least {} characters.",
        MIN_PASSWORD_LENGTH
    )));
    assert!(messages.contains(&"This password is entirely numeric.".to_string()));
}
