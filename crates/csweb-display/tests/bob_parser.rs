mod common;

use common::*;
use csweb_display::parse_plt;
use csweb_display::types::Tab;

#[test]
fn label_with_position_color_and_text() {
    let label = bob_widget(
        r#"<widget type="label" version="2.0.0">
            <name>Title</name>
            <x>10</x>
            <y>20</y>
            <width>550</width>
            <height>31</height>
            <foreground_color><color red="255" green="0" blue="0"/></foreground_color>
            <text>Hello</text>
        </widget>"#,
    );
    assert_eq!(label.widget_type, "label");
    assert_eq!(label.position(), Some(&absolute("10px", "20px", "550px", "31px")));
    assert_eq!(label.get("foregroundColor"), Some(&PropValue::Color(Color::RED)));
    assert_eq!(label.text(), Some("Hello"));
}

#[test]
fn display_root_fills_its_container() {
    let display = bob("<width>1200</width><height>900</height>");
    assert_eq!(display.widget_type, "display");
    assert_eq!(display.position(), Some(&Position::relative("1200px", "900px")));

    let sized_by_default = bob("");
    assert_eq!(sized_by_default.position(), Some(&Position::relative("800px", "800px")));
}

#[test]
fn missing_sizes_use_widget_defaults() {
    let led = bob_widget(r#"<widget type="led"><x>5</x></widget>"#);
    assert_eq!(led.widget_type, "led");
    assert_eq!(led.position(), Some(&absolute("5px", "0px", "20px", "20px")));

    let button = bob_widget(r#"<widget type="action_button"><height>40</height></widget>"#);
    assert_eq!(button.position(), Some(&absolute("0px", "0px", "100px", "40px")));
}

#[test]
fn unknown_types_become_shapes_without_position() {
    let widget = bob_widget(r#"<widget type="gauge"><x>1</x><y>1</y></widget>"#);
    assert_eq!(widget.widget_type, "shape");
    assert_eq!(widget.position(), None);
}

#[test]
fn omitted_flags_default_to_true() {
    let label = bob_widget(r#"<widget type="label"><text>x</text></widget>"#);
    assert_eq!(label.get("precisionFromPv"), Some(&PropValue::Bool(true)));
    assert_eq!(label.get("showUnits"), Some(&PropValue::Bool(true)));
    assert_eq!(label.get("wrapWords"), Some(&PropValue::Bool(true)));

    let readback = bob_widget(
        r#"<widget type="textupdate">
            <pv_name>SR:X</pv_name>
            <precision>2</precision>
            <show_units>false</show_units>
            <wrap_words>false</wrap_words>
        </widget>"#,
    );
    assert_eq!(readback.widget_type, "readback");
    assert_eq!(readback.get("precision"), Some(&PropValue::Number(2.0)));
    assert!(!readback.props.contains_key("precisionFromPv"));
    assert_eq!(readback.get("showUnits"), Some(&PropValue::Bool(false)));
    assert_eq!(readback.get("wrapWords"), Some(&PropValue::Bool(false)));
}

#[test]
fn pv_widgets_list_their_pv() {
    let readback = bob_widget(r#"<widget type="textupdate"><pv_name>SR:CURRENT</pv_name></widget>"#);
    assert_eq!(readback.get("pvName"), Some(&PropValue::Pv(Pv::new("SR:CURRENT", "ca"))));
    let names: Vec<_> = readback
        .pv_metadata_list()
        .iter()
        .map(|metadata| metadata.pv_name.qualified_name())
        .collect();
    assert_eq!(names, ["ca://SR:CURRENT"]);
}

#[test]
fn borders_without_width_are_unstyled() {
    let plain = bob_widget(r#"<widget type="label"><text>a</text></widget>"#);
    assert_eq!(plain.border(), Some(&Border::NONE));

    let framed = bob_widget(
        r#"<widget type="label">
            <border_width>2</border_width>
            <border_color><color red="0" green="0" blue="255"/></border_color>
        </widget>"#,
    );
    assert_eq!(framed.border(), Some(&Border::new(BorderStyle::Line, Color::BLUE, 2.0)));
}

#[test]
fn fonts_read_family_style_and_size() {
    let label = bob_widget(
        r#"<widget type="label">
            <font><font family="Liberation Sans" style="BOLD" size="16.0"/></font>
        </widget>"#,
    );
    assert_eq!(
        label.get("font"),
        Some(&PropValue::Font(Font::new(
            Some(16.0),
            Some(FontStyle::Bold),
            Some("Liberation Sans")
        )))
    );
}

#[test]
fn exit_buttons_get_an_exit_action() {
    let button = bob_widget(r#"<widget type="action_button"><text>EXIT</text></widget>"#);
    let actions = button.actions().expect("exit action added");
    assert_eq!(actions.actions, [WidgetAction::exit()]);

    let other = bob_widget(r#"<widget type="action_button"><text>Start</text></widget>"#);
    assert_eq!(other.actions(), None);
}

#[test]
fn open_display_and_write_pv_actions() {
    let button = bob_widget(
        r#"<widget type="action_button">
            <text>Go</text>
            <actions execute_as_one="true">
                <action type="open_display">
                    <file>detail.bob</file>
                    <target>tab</target>
                    <name>Side</name>
                    <description>Details</description>
                </action>
                <action type="open_display">
                    <file>/abs/other.bob</file>
                    <target>replace</target>
                </action>
                <action type="write_pv">
                    <pv_name>SR:RESET</pv_name>
                    <value>1</value>
                    <description>Reset</description>
                </action>
                <action type="execute"><command>ls</command></action>
            </actions>
        </widget>"#,
    );
    let actions = button.actions().expect("actions parsed");
    assert!(actions.execute_as_one);
    assert_eq!(actions.actions.len(), 3);
    assert_eq!(
        actions.actions[0],
        WidgetAction::OpenTab {
            dynamic_info: DynamicInfo {
                name: "detail.bob".into(),
                location: "Side".into(),
                description: Some("Details".into()),
                file: OpiFile::new("/opi/screens/detail.bob", MacroMap::new()),
            },
        }
    );
    match &actions.actions[1] {
        WidgetAction::OpenPage { dynamic_info } => {
            assert_eq!(dynamic_info.location, "main");
            assert_eq!(dynamic_info.file.path, "/abs/other.bob");
        }
        other => panic!("expected open page, got {other:?}"),
    }
    match &actions.actions[2] {
        WidgetAction::WritePv { write_pv_info } => {
            assert_eq!(write_pv_info.pv_name, "ca://SR:RESET");
            assert_eq!(write_pv_info.value, "1");
        }
        other => panic!("expected write pv, got {other:?}"),
    }
}

#[test]
fn children_keep_document_order() {
    let display = bob(
        r#"<widget type="group">
            <name>Outer</name>
            <widget type="label"><text>one</text></widget>
            <widget type="led"/>
        </widget>
        <widget type="label"><text>two</text></widget>"#,
    );
    let kinds: Vec<_> = display.walk().map(|widget| widget.widget_type.as_str()).collect();
    assert_eq!(kinds, ["display", "groupbox", "label", "led", "label"]);
}

#[test]
fn tabs_carry_their_own_widgets() {
    let tabs = bob_widget(
        r#"<widget type="tabs">
            <tabs>
                <tab>
                    <name>One</name>
                    <children>
                        <widget type="label"><text>A</text></widget>
                    </children>
                </tab>
                <tab>
                    <name>Two</name>
                    <children/>
                </tab>
            </tabs>
        </widget>"#,
    );
    assert_eq!(tabs.widget_type, "tabcontainer");
    let Some(PropValue::Tabs(tabs)) = tabs.get("tabs") else {
        panic!("tabs not parsed");
    };
    let names: Vec<_> = tabs.iter().map(|tab: &Tab| tab.props["name"].clone()).collect();
    assert_eq!(names, [PropValue::string("One"), PropValue::string("Two")]);
    assert_eq!(tabs[0].children.len(), 1);
    assert_eq!(tabs[0].children[0].text(), Some("A"));
    assert!(tabs[1].children.is_empty());
}

#[test]
fn plots_read_traces_and_axes() {
    let plot = bob_widget(
        r#"<widget type="xyplot">
            <traces>
                <trace>
                    <name>Current</name>
                    <y_pv>SR:Y</y_pv>
                    <trace_type>1</trace_type>
                    <color><color red="255" green="0" blue="0"/></color>
                </trace>
            </traces>
            <y_axes>
                <y_axis>
                    <title>Amps</title>
                    <on_right>true</on_right>
                </y_axis>
            </y_axes>
        </widget>"#,
    );
    let Some(PropValue::Traces(traces)) = plot.get("traces") else {
        panic!("traces not parsed");
    };
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].name, "Current");
    assert_eq!(traces[0].y_pv, "SR:Y");
    assert_eq!(traces[0].trace_type, 1.0);
    assert_eq!(traces[0].color, Color::RED);

    let Some(PropValue::Axes(axes)) = plot.get("axes") else {
        panic!("axes not parsed");
    };
    assert_eq!(axes[0].title, "Amps");
    assert!(axes[0].on_right);

    let names: Vec<_> = plot
        .pv_metadata_list()
        .iter()
        .map(|metadata| metadata.pv_name.qualified_name())
        .collect();
    assert_eq!(names, ["ca://SR:Y"]);
}

#[test]
fn rules_convert_values_for_their_target() {
    let label = bob_widget(
        r#"<widget type="label">
            <rules>
                <rule name="Alarm" prop_id="foreground_color" out_exp="false">
                    <exp bool_exp="pv0 &gt; 5">
                        <value><color red="0" green="0" blue="255"/></value>
                    </exp>
                    <pv_name>SR:X</pv_name>
                </rule>
            </rules>
        </widget>"#,
    );
    let rules = label.rules();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].prop, "foregroundColor");
    assert_eq!(
        rules[0].pvs,
        [RulePv {
            pv_name: Pv::new("SR:X", "ca"),
            trigger: true,
        }]
    );
    assert_eq!(rules[0].expressions[0].bool_exp, "pv0 > 5");
    assert_eq!(
        rules[0].expressions[0].converted_value,
        Some(PropValue::Color(Color::BLUE))
    );
}

#[test]
fn scripts_keep_their_text() {
    let label = bob_widget(
        r#"<widget type="label">
            <scripts>
                <script file="EmbeddedJs">
                    <text><![CDATA[var x = 1;]]></text>
                    <pv_name>SR:X</pv_name>
                </script>
            </scripts>
        </widget>"#,
    );
    let Some(PropValue::Scripts(scripts)) = label.get("scripts") else {
        panic!("scripts not parsed");
    };
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].file.as_deref(), Some("EmbeddedJs"));
    assert_eq!(scripts[0].text, "var x = 1;");
    assert_eq!(scripts[0].pvs[0].pv_name, Pv::new("SR:X", "ca"));
}

const BEAM_PLT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<databrowser>
  <title>Beam</title>
  <scroll>false</scroll>
  <update_period>2</update_period>
  <axes>
    <axis>
      <name>mA</name>
      <use_axis_name>true</use_axis_name>
      <right>true</right>
      <min>0</min>
      <max>300</max>
    </axis>
  </axes>
  <pvlist>
    <pv>
      <display_name>Current</display_name>
      <name>SR:CURRENT</name>
      <linewidth>2</linewidth>
      <color><red>255</red><green>0</green><blue>0</blue></color>
    </pv>
  </pvlist>
</databrowser>"#;

#[test]
fn databrowsers_load_their_plt_file() {
    let registry = WidgetRegistry::standard();
    let loader = MapLoader::default().with("/opi/screens/beam.plt", BEAM_PLT);
    let options = ParseOptions::new(&registry).with_file_loader(&loader);
    let document = bob_document(r#"<widget type="databrowser"><file>beam.plt</file></widget>"#);
    let browser = first_child(parse_bob(&document, BOB_PATH, &options).unwrap());

    let Some(PropValue::Plt(plt)) = browser.get("plt") else {
        panic!("plt not parsed");
    };
    assert_eq!(plt.title, "Beam");
    assert!(!plt.scroll);
    assert_eq!(plt.update_period, 2.0);
    assert_eq!(plt.axes.len(), 1);
    assert_eq!(plt.axes[0].title, "mA");
    assert!(plt.axes[0].on_right);
    assert_eq!(plt.axes[0].maximum, 300.0);
    assert_eq!(plt.pvlist[0].y_pv, "SR:CURRENT");
    assert_eq!(plt.pvlist[0].line_width, 2.0);
    assert_eq!(plt.pvlist[0].color, Color::RED);

    let names: Vec<_> = browser
        .pv_metadata_list()
        .iter()
        .map(|metadata| metadata.pv_name.qualified_name())
        .collect();
    assert_eq!(names, ["ca://SR:CURRENT"]);
}

#[test]
fn databrowsers_without_a_loader_use_defaults() {
    let browser = bob_widget(r#"<widget type="databrowser"><file>beam.plt</file></widget>"#);
    assert_eq!(
        browser.get("plt"),
        Some(&PropValue::Plt(Box::default()))
    );
}

#[test]
fn plt_files_parse_on_their_own() {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    let plt = parse_plt(BEAM_PLT, "/opi/beam.plt", &options).unwrap();
    assert_eq!(plt.start, "1 minute");
    assert_eq!(plt.pvlist.len(), 1);

    let error = parse_plt("<plot/>", "/opi/beam.plt", &options).unwrap_err();
    assert_eq!(error, FileLoadError::MissingRoot("databrowser".into()));
}
