use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str) {
    let hx_post = form
        .value()
        .attr("hx-post")
        .expect("hx-post attribute missing");

    assert_eq!(
        hx_post, endpoint,
        "want form with attribute hx-post=\"{endpoint}\", got {hx_post:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_required = input.value().attr("required");

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            assert!(
                input_required.is_some(),
                "want input with name {name} to have the required attribute but got none"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Assert that an inline error message containing `want_fragment` is
/// rendered somewhere in `html`. The comparison ignores case.
#[track_caller]
pub(crate) fn assert_form_error_message(html: &Html, want_fragment: &str) {
    let error_selector = Selector::parse("p.text-red-500").unwrap();
    let error_messages: Vec<String> = html
        .select(&error_selector)
        .map(|element| element.text().collect::<Vec<_>>().join(""))
        .collect();

    assert!(
        error_messages
            .iter()
            .any(|message| message.to_lowercase().contains(&want_fragment.to_lowercase())),
        "want an error message containing {want_fragment:?}, got {error_messages:?}"
    );
}
