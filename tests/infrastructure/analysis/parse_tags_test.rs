use vitrine::infrastructure::analysis::parse_tags;

#[test]
fn given_json_array_when_parsing_then_returns_tags() {
    assert_eq!(
        parse_tags(r#"["bob cut", "copper", "blunt fringe"]"#),
        vec!["bob cut", "copper", "blunt fringe"]
    );
}

#[test]
fn given_fenced_json_when_parsing_then_fence_is_stripped() {
    let content = "```json\n[\"coffin nails\", \"chrome\"]\n```";
    assert_eq!(parse_tags(content), vec!["coffin nails", "chrome"]);
}

#[test]
fn given_plain_list_when_parsing_then_splits_on_commas_and_lines() {
    let content = "- smoky eye\n- \"winged liner\", nude lip";
    assert_eq!(
        parse_tags(content),
        vec!["smoky eye", "winged liner", "nude lip"]
    );
}

#[test]
fn given_blank_content_when_parsing_then_empty() {
    assert!(parse_tags("  \n ").is_empty());
}
