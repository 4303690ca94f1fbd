use vitrine::domain::{ServiceCategory, ServiceContext};

#[test]
fn given_exact_keyword_when_parsing_then_category_matches() {
    assert_eq!(ServiceCategory::from_label("Nails"), ServiceCategory::Nails);
    assert_eq!(ServiceCategory::from_label("barber"), ServiceCategory::Barber);
    assert_eq!(ServiceCategory::from_label("MUA"), ServiceCategory::Makeup);
}

#[test]
fn given_label_naming_two_categories_when_parsing_then_leftmost_wins() {
    assert_eq!(
        ServiceCategory::from_label("haircare-and-nails"),
        ServiceCategory::Hair
    );
    assert_eq!(
        ServiceCategory::from_label("Nails & Hair"),
        ServiceCategory::Nails
    );
}

#[test]
fn given_keyword_inside_longer_word_when_parsing_then_it_does_not_match() {
    assert_eq!(
        ServiceCategory::from_label("chairside consults"),
        ServiceCategory::Other
    );
    assert_eq!(ServiceCategory::from_label("skinny"), ServiceCategory::Other);
}

#[test]
fn given_empty_label_when_parsing_then_other() {
    assert_eq!(ServiceCategory::from_label(""), ServiceCategory::Other);
    assert_eq!(ServiceCategory::from_label(" - "), ServiceCategory::Other);
}

#[test]
fn given_service_without_category_when_deriving_then_other() {
    let service = ServiceContext {
        title: "Consultation".to_string(),
        ..ServiceContext::default()
    };
    assert_eq!(service.category(), ServiceCategory::Other);
}

#[test]
fn given_each_category_when_displaying_then_lowercase_name_and_hint_present() {
    for category in [
        ServiceCategory::Hair,
        ServiceCategory::Nails,
        ServiceCategory::Makeup,
        ServiceCategory::Skincare,
        ServiceCategory::Lashes,
        ServiceCategory::Barber,
        ServiceCategory::Massage,
        ServiceCategory::Tattoo,
        ServiceCategory::Other,
    ] {
        assert_eq!(category.to_string(), category.as_str());
        assert_eq!(ServiceCategory::from_label(category.as_str()), category);
        assert!(!category.analysis_hint().is_empty());
    }
}
