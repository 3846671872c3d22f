use crate::inference::{infer_variables, Inferencer};
use crate::keywords::is_keyword;
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,5}"
}

/// Snippets of template syntax the passes recognize, plus filler text.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        name().prop_map(|n| format!("{{{{ {} }}}}", n)),
        (name(), name()).prop_map(|(a, b)| format!("{{{{ {}.{} | upper }}}}", a, b)),
        (name(), name()).prop_map(|(a, b)| format!("{{% for {} in {} %}}", a, b)),
        Just("{% endfor %}".to_string()),
        (name(), name()).prop_map(|(a, b)| format!("{{% if {} and not {}.ok %}}", a, b)),
        (name(), 0usize..6).prop_map(|(a, i)| format!("{{{{ {}[{}] }}}}", a, i)),
        (name(), name()).prop_map(|(a, b)| format!("{{% set {} = {} %}}", a, b)),
        "[ a-z<>/.]{0,12}",
    ]
}

fn template() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

proptest! {
    /// A template made only of `{{ name }}` tags maps every name to "".
    #[test]
    fn plain_outputs_are_empty_strings(
        names in prop::collection::vec(
            "[a-z_][a-z0-9_]{0,7}".prop_filter("keyword", |n| !is_keyword(n)),
            1..6,
        )
    ) {
        let template = names
            .iter()
            .map(|n| format!("{{{{ {} }}}}", n))
            .collect::<Vec<_>>()
            .join(" ");

        let mut expected = serde_json::Map::new();
        for n in &names {
            expected.insert(n.clone(), serde_json::Value::String(String::new()));
        }

        prop_assert_eq!(infer_variables(&template).to_json(), serde_json::Value::Object(expected));
    }

    #[test]
    fn inference_is_idempotent(template in template()) {
        let inferencer = Inferencer::new();
        prop_assert_eq!(inferencer.infer(&template), inferencer.infer(&template));
    }

    /// Every reported name occurs in the template and is not a keyword.
    #[test]
    fn reported_names_come_from_the_template(template in template()) {
        for name in infer_variables(&template).names() {
            prop_assert!(template.contains(name), "{} not in {}", name, template);
            prop_assert!(!is_keyword(name));
        }
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC{0,200}") {
        let _ = infer_variables(&text);
    }
}
