use vitrine::infrastructure::observability::sanitize_prompt;

#[test]
fn given_blank_text_when_sanitizing_then_marked_empty() {
    assert_eq!(sanitize_prompt("   "), "[EMPTY]");
}

#[test]
fn given_short_context_when_sanitizing_then_unchanged() {
    assert_eq!(
        sanitize_prompt("Gel manicure. Visual features: chrome"),
        "Gel manicure. Visual features: chrome"
    );
}

#[test]
fn given_long_context_when_sanitizing_then_truncated_with_length() {
    let long = "a".repeat(250);
    let sanitized = sanitize_prompt(&long);

    assert!(sanitized.starts_with(&"a".repeat(100)));
    assert!(sanitized.ends_with("... (250 chars total)"));
}

#[test]
fn given_multibyte_text_when_truncating_then_char_boundary_is_respected() {
    let long = "ø".repeat(150);
    let sanitized = sanitize_prompt(&long);

    assert!(sanitized.contains("(150 chars total)"));
}

#[test]
fn given_credentials_when_sanitizing_then_redacted() {
    assert_eq!(
        sanitize_prompt("Authorization: Bearer sk-123 done"),
        "Authorization: Bearer [REDACTED] done"
    );
    assert_eq!(
        sanitize_prompt("https://cdn.example.com/a.jpg?token=abc&x=1"),
        "https://cdn.example.com/a.jpg?token=[REDACTED]&x=1"
    );
    assert_eq!(
        sanitize_prompt("contact jane@example.com"),
        "contact jane@[REDACTED]"
    );
}
