mod common;

use common::*;

fn text_update(extra: &str) -> String {
    format!(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.TextUpdate" version="1.0.0">
            <x>1</x>
            <y>2</y>
            <width>30</width>
            <height>40</height>
            {extra}
        </widget>"#
    )
}

#[test]
fn pv_names_use_the_default_protocol() {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry).with_protocol("xxx");
    let document = opi_document(&text_update("<pv_name>abc</pv_name>"));
    let readback = first_child(parse_opi(&document, OPI_PATH, &options).unwrap());

    let Some(PropValue::Pv(pv)) = readback.get("pvName") else {
        panic!("pv name not parsed");
    };
    assert_eq!(pv.qualified_name(), "xxx://abc");
    assert_eq!(
        readback.pv_metadata_list()[0].pv_name.qualified_name(),
        "xxx://abc"
    );

    let qualified = opi_widget(&text_update("<pv_name>pva://SR:X</pv_name>"));
    assert_eq!(qualified.get("pvName"), Some(&PropValue::Pv(Pv::new("SR:X", "pva"))));
}

#[test]
fn display_root_is_relative() {
    let display = opi("");
    assert_eq!(display.widget_type, "display");
    assert_eq!(display.position(), Some(&Position::relative("800px", "600px")));
}

#[test]
fn positions_are_in_pixels() {
    let readback = opi_widget(&text_update(""));
    assert_eq!(readback.widget_type, "readback");
    assert_eq!(readback.position(), Some(&absolute("1px", "2px", "30px", "40px")));
}

#[test]
fn outset_borders_are_always_thin_and_grey() {
    let readback = opi_widget(&text_update(
        r#"<border_style>2</border_style>
           <border_width>5</border_width>
           <border_color><color red="1" green="2" blue="3"/></border_color>"#,
    ));
    assert_eq!(
        readback.border(),
        Some(&Border::new(BorderStyle::Outset, Color::GREY, 1.0))
    );
}

#[test]
fn incomplete_borders_keep_defaults_after_the_first_gap() {
    let readback = opi_widget(&text_update(
        r#"<border_style>1</border_style>
           <border_color><color red="0" green="0" blue="255"/></border_color>"#,
    ));
    assert_eq!(
        readback.border(),
        Some(&Border::new(BorderStyle::Line, Color::BLACK, 0.0))
    );
}

#[test]
fn thin_borders_take_the_line_color() {
    let shape = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.Rectangle" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <border_style>1</border_style>
            <border_width>1</border_width>
            <border_color><color red="0" green="0" blue="0"/></border_color>
            <line_color><color red="0" green="0" blue="255"/></line_color>
        </widget>"#,
    );
    assert_eq!(shape.widget_type, "shape");
    assert_eq!(
        shape.border(),
        Some(&Border::new(BorderStyle::Line, Color::BLUE, 1.0))
    );
}

#[test]
fn type_ids_map_to_kinds() {
    let display = opi(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.Label" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <text>Hi</text>
        </widget>
        <widget typeId="org.csstudio.opibuilder.widgets.RoundedRectangle" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
        </widget>
        <widget typeId="org.csstudio.opibuilder.widgets.Gauge" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
        </widget>"#,
    );
    let kinds: Vec<_> = display
        .children
        .iter()
        .map(|widget| widget.widget_type.as_str())
        .collect();
    assert_eq!(kinds, ["label", "shape", "shape"]);
    assert_eq!(display.children[0].text(), Some("Hi"));
}

#[test]
fn empty_text_is_an_empty_string() {
    let label = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.Label" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <text></text>
        </widget>"#,
    );
    assert_eq!(label.text(), Some(""));
}

#[test]
fn precision_suppresses_the_pv_precision_flag() {
    let readback = opi_widget(&text_update(
        "<precision>3</precision><format_type>4</format_type><show_units>false</show_units>",
    ));
    assert_eq!(readback.get("precision"), Some(&PropValue::Number(3.0)));
    assert_eq!(readback.get("formatType"), Some(&PropValue::string("string")));
    assert!(!readback.props.contains_key("precisionFromPv"));
    assert_eq!(readback.get("showUnits"), Some(&PropValue::Bool(false)));
    assert_eq!(readback.get("wrapWords"), Some(&PropValue::Bool(true)));
}

#[test]
fn fonts_read_legacy_font_data() {
    let label = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.Label" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <font><opifont.name fontName="Liberation Sans" height="12" style="1">Header 2</opifont.name></font>
        </widget>"#,
    );
    assert_eq!(
        label.get("font"),
        Some(&PropValue::Font(Font::new(
            Some(12.0),
            Some(FontStyle::Bold),
            Some("Liberation Sans")
        )))
    );
}

#[test]
fn actions_open_displays_and_write_pvs() {
    let button = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.ActionButton" version="2.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <text>Open</text>
            <actions hook="false" hook_all="false">
                <action type="OPEN_DISPLAY">
                    <path>detail.opi</path>
                    <mode>3</mode>
                    <description></description>
                </action>
                <action type="WRITE_PV">
                    <pv_name>loc://x</pv_name>
                    <value>1</value>
                    <timeout>10</timeout>
                    <description>Set</description>
                </action>
                <action type="EXECUTE_CMD"><command>ls</command></action>
            </actions>
        </widget>"#,
    );
    let actions = button.actions().expect("actions parsed");
    assert!(!actions.execute_as_one);
    assert_eq!(actions.actions.len(), 2);
    assert_eq!(
        actions.actions[0],
        WidgetAction::OpenTab {
            dynamic_info: DynamicInfo {
                name: "detail.opi".into(),
                location: "details".into(),
                description: None,
                file: OpiFile::new("/opi/screens/detail.opi", MacroMap::new()),
            },
        }
    );
    let WidgetAction::WritePv { write_pv_info } = &actions.actions[1] else {
        panic!("expected write pv");
    };
    assert_eq!(write_pv_info.pv_name, "loc://x");
    assert_eq!(write_pv_info.description.as_deref(), Some("Set"));
}

#[test]
fn indexed_traces_and_axes() {
    let plot = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.xyGraph" version="1.0.0">
            <x>0</x><y>0</y><width>400</width><height>300</height>
            <trace_count>1</trace_count>
            <trace_0_y_pv>SR:Y</trace_0_y_pv>
            <trace_0_line_width>2</trace_0_line_width>
            <trace_0_trace_color><color red="255" green="0" blue="0"/></trace_0_trace_color>
            <axis_count>2</axis_count>
            <axis_0_axis_title>Time</axis_0_axis_title>
            <axis_1_axis_title>Amps</axis_1_axis_title>
            <axis_1_left_bottom_side>false</axis_1_left_bottom_side>
            <axis_1_maximum>50</axis_1_maximum>
        </widget>"#,
    );
    assert_eq!(plot.widget_type, "xyplot");
    let Some(PropValue::Traces(traces)) = plot.get("traces") else {
        panic!("traces not parsed");
    };
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].name, "SR:Y");
    assert_eq!(traces[0].line_width, 2.0);
    assert_eq!(traces[0].color, Color::RED);

    let Some(PropValue::Axes(axes)) = plot.get("axes") else {
        panic!("axes not parsed");
    };
    let titles: Vec<_> = axes.iter().map(|axis| axis.title.as_str()).collect();
    assert_eq!(titles, ["Time", "Amps"]);
    assert!(!axes[0].on_right);
    assert!(axes[1].on_right);
    assert_eq!(axes[1].maximum, 50.0);

    assert_eq!(plot.pv_metadata_list()[0].pv_name, Pv::new("SR:Y", "ca"));
}

#[test]
fn points_are_relative_to_the_widget() {
    let line = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.polyline" version="1.0.0">
            <x>10</x><y>20</y><width>10</width><height>5</height>
            <points>
                <point x="10" y="20"/>
                <point x="20" y="25"/>
            </points>
        </widget>"#,
    );
    assert_eq!(line.widget_type, "line");
    assert_eq!(
        line.get("points"),
        Some(&PropValue::Points(Points::new(vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 10.0, y: 5.0 },
        ])))
    );
}

#[test]
fn rules_list_pvs_with_triggers() {
    let label = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.Label" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <rules>
                <rule name="Colour" prop_id="background_color" out_exp="false">
                    <exp bool_exp="pv0 == 1">
                        <value><color red="255" green="0" blue="0"/></value>
                    </exp>
                    <pv trig="true">SR:A</pv>
                    <pv trig="false">SR:B</pv>
                </rule>
            </rules>
        </widget>"#,
    );
    let rule = &label.rules()[0];
    assert_eq!(rule.name, "Colour");
    assert_eq!(rule.prop, "backgroundColor");
    let triggers: Vec<_> = rule.pvs.iter().map(|pv| pv.trigger).collect();
    assert_eq!(triggers, [true, false]);
    assert_eq!(
        rule.expressions[0].converted_value,
        Some(PropValue::Color(Color::RED))
    );
}

#[test]
fn linked_displays_resolve_their_file() {
    let embedded = opi_widget(
        r#"<widget typeId="org.csstudio.opibuilder.widgets.linkingContainer" version="1.0.0">
            <x>0</x><y>0</y><width>10</width><height>10</height>
            <opi_file>../common/header.opi</opi_file>
            <macros>
                <include_parent_macros>true</include_parent_macros>
                <DEVICE>SR-DI</DEVICE>
            </macros>
        </widget>"#,
    );
    assert_eq!(embedded.widget_type, "embeddedDisplay");
    let Some(PropValue::File(file)) = embedded.get("file") else {
        panic!("file not parsed");
    };
    assert_eq!(file.path, "/opi/common/header.opi");
    assert_eq!(file.macros.get("DEVICE").map(String::as_str), Some("SR-DI"));
}

#[test]
fn documents_need_a_display_root() {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    let error = parse_opi("<screen/>", OPI_PATH, &options).unwrap_err();
    assert_eq!(error, FileLoadError::MissingRoot("display".into()));
}
