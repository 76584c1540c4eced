mod common;

use common::*;

#[test]
fn image_paths_follow_the_display() {
    let image = bob_widget(r#"<widget type="picture"><file>../img/logo.png</file></widget>"#);
    assert_eq!(image.widget_type, "image");
    assert_eq!(image.get("imageFile"), Some(&PropValue::string("/opi/img/logo.png")));
}

#[test]
fn urls_and_absolute_paths_are_untouched() {
    let display = bob(
        r#"<widget type="picture"><file>https://cdn.example.org/logo.png</file></widget>
           <widget type="picture"><file>/shared/logo.png</file></widget>"#,
    );
    let files: Vec<_> = display
        .children
        .iter()
        .map(|image| image.get("imageFile").and_then(PropValue::as_str))
        .collect();
    assert_eq!(
        files,
        [Some("https://cdn.example.org/logo.png"), Some("/shared/logo.png")]
    );
}

#[test]
fn displays_loaded_over_http_resolve_against_the_url() {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    let document = bob_document(r#"<widget type="embedded"><file>sub/detail.bob</file></widget>"#);
    let display = parse_bob(&document, "http://host/opi/main.bob", &options).unwrap();
    let Some(PropValue::File(file)) = display.children[0].get("file") else {
        panic!("file not parsed");
    };
    assert_eq!(file.path, "http://host/opi/sub/detail.bob");
}

#[test]
fn macros_are_substituted_before_resolving() {
    let registry = WidgetRegistry::standard();
    let mut macros = MacroMap::new();
    macros.insert("SUB".into(), "detail".into());
    let options = ParseOptions::new(&registry).with_macros(&macros);
    let document = bob_document(
        r#"<widget type="embedded">
            <file>$(SUB).bob</file>
            <macros><DEVICE>SR-DI</DEVICE></macros>
        </widget>"#,
    );
    let embedded = first_child(parse_bob(&document, BOB_PATH, &options).unwrap());
    assert_eq!(embedded.widget_type, "embeddedDisplay");
    let Some(PropValue::File(file)) = embedded.get("file") else {
        panic!("file not parsed");
    };
    assert_eq!(file.path, "/opi/screens/detail.bob");
    assert_eq!(file.macros.get("DEVICE").map(String::as_str), Some("SR-DI"));
}

#[test]
fn symbol_lists_and_rule_values_are_resolved() {
    let symbol = bob_widget(
        r#"<widget type="symbol">
            <pv_name>SR:STATE</pv_name>
            <symbols>
                <symbol>a.png</symbol>
                <symbol>b.png</symbol>
            </symbols>
            <rules>
                <rule name="Swap" prop_id="symbols[1]" out_exp="false">
                    <exp bool_exp="pv0 == 1"><value>c.png</value></exp>
                    <pv_name>SR:STATE</pv_name>
                </rule>
            </rules>
        </widget>"#,
    );
    assert_eq!(
        symbol.get("symbols"),
        Some(&PropValue::StringList(vec![
            "/opi/screens/a.png".into(),
            "/opi/screens/b.png".into(),
        ]))
    );
    let rule = &symbol.rules()[0];
    assert_eq!(rule.prop, "symbols[1]");
    assert_eq!(
        rule.expressions[0].converted_value,
        Some(PropValue::string("/opi/screens/c.png"))
    );
}

#[test]
fn file_rules_convert_through_the_file_parser() {
    let embedded = bob_widget(
        r#"<widget type="embedded">
            <file>first.bob</file>
            <rules>
                <rule name="Page" prop_id="file" out_exp="false">
                    <exp bool_exp="pv0 == 2"><value>second.bob</value></exp>
                    <pv_name>SR:PAGE</pv_name>
                </rule>
            </rules>
        </widget>"#,
    );
    let Some(PropValue::File(file)) = &embedded.rules()[0].expressions[0].converted_value else {
        panic!("rule value not converted");
    };
    assert_eq!(file.path, "/opi/screens/second.bob");
}

#[test]
fn only_buttons_labelled_exit_get_the_exit_action() {
    let display = bob(
        r#"<widget type="action_button"><text>Exit</text></widget>
           <widget type="label"><text>Exit</text></widget>
           <widget type="action_button">
               <text>exit</text>
               <actions>
                   <action type="open_webpage"><url>https://example.org</url></action>
               </actions>
           </widget>"#,
    );
    assert_eq!(
        display.children[0].actions().map(|actions| actions.actions.clone()),
        Some(vec![WidgetAction::exit()])
    );
    assert_eq!(display.children[1].actions(), None);
    let kept = display.children[2].actions().expect("actions parsed");
    assert_eq!(kept.actions.len(), 1);
    assert!(matches!(kept.actions[0], WidgetAction::OpenWebpage { .. }));
}
