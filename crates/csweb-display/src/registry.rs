//! Widget kinds and the properties each kind accepts.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

/// Kind used for unmapped or unregistered widget types.
pub const FALLBACK_KIND: &str = "shape";

/// Properties every widget accepts.
const COMMON_PROPS: &[&str] = &[
    "position", "rules", "scripts", "actions", "tooltip", "border", "visible",
];

/// Extra properties of widgets bound to a PV.
const PV_PROPS: &[&str] = &["pvName", "alarmBorder", "pvType", "pvMetadataList"];

/// Ordered set of canonical property names a widget kind accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropSchema {
    names: IndexSet<SmolStr>,
}

impl PropSchema {
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|name| SmolStr::new(name)).collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(SmolStr::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Appends names not already present, keeping existing positions.
    fn extend(&mut self, names: &[&str]) {
        for name in names {
            self.names.insert(SmolStr::new(name));
        }
    }
}

/// How a kind's own props combine with the shared sets.
#[derive(Debug, Clone, Copy)]
enum Base {
    /// Own props, then the common set.
    Widget,
    /// Own props, then the common and PV sets.
    PvWidget,
    /// Common set first, then own props.
    WidgetFirst,
}

/// Registry of widget kinds passed explicitly into every parse.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    kinds: FxHashMap<SmolStr, PropSchema>,
}

impl WidgetRegistry {
    /// An empty registry. [`FALLBACK_KIND`] should be registered before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in widget kind.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (kind, base, own) in STANDARD_KINDS {
            registry.register_with_base(kind, *base, own);
        }
        registry
    }

    /// Register a kind with its own props plus the common set.
    pub fn register(&mut self, kind: &str, props: &[&str]) {
        self.register_with_base(kind, Base::Widget, props);
    }

    /// Register a PV-bound kind with its own props plus the common and PV sets.
    pub fn register_pv_widget(&mut self, kind: &str, props: &[&str]) {
        self.register_with_base(kind, Base::PvWidget, props);
    }

    fn register_with_base(&mut self, kind: &str, base: Base, own: &[&str]) {
        let mut schema = PropSchema::default();
        match base {
            Base::Widget => {
                schema.extend(own);
                schema.extend(COMMON_PROPS);
            }
            Base::PvWidget => {
                schema.extend(own);
                schema.extend(COMMON_PROPS);
                schema.extend(PV_PROPS);
            }
            Base::WidgetFirst => {
                schema.extend(COMMON_PROPS);
                schema.extend(own);
            }
        }
        self.kinds.insert(SmolStr::new(kind), schema);
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&PropSchema> {
        self.kinds.get(kind)
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    /// Resolve a kind, falling back to [`FALLBACK_KIND`] when it is unknown.
    #[must_use]
    pub fn resolve<'a>(&'a self, kind: &'a str) -> (&'a str, Option<&'a PropSchema>) {
        if let Some(schema) = self.kinds.get(kind) {
            return (kind, Some(schema));
        }
        debug!(kind, "unrecognized widget type, using {FALLBACK_KIND}");
        (FALLBACK_KIND, self.kinds.get(FALLBACK_KIND))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(SmolStr::as_str)
    }
}

#[rustfmt::skip]
const STANDARD_KINDS: &[(&str, Base, &[&str])] = &[
    ("actionbutton", Base::PvWidget, &[
        "text", "actions", "image", "backgroundColor", "foregroundColor", "font", "border",
        "visible", "enabled", "transparent", "rotationStep", "height", "width",
    ]),
    ("arc", Base::Widget, &[
        "width", "height", "backgroundColor", "foregroundColor", "fill", "startAngle",
        "totalAngle", "lineWidth",
    ]),
    ("boolbutton", Base::PvWidget, &[
        "pvName", "height", "width", "onState", "offState", "onColor", "offColor", "onLabel",
        "offLabel", "squareButton", "foregroundColor", "backgroundColor", "points",
        "rotationAngle", "effect3d", "showBooleanLabel", "showLed", "confirmMessage",
        "labelsFromPv", "enabled", "font", "textAlign", "textAlignV",
    ]),
    ("bytemonitor", Base::PvWidget, &[
        "width", "height", "onColor", "offColor", "numBits", "startBit", "horizontal",
        "bitReverse", "square", "ledBorder", "ledBorderColor", "effect3d",
    ]),
    ("checkbox", Base::PvWidget, &["label", "font", "foregroundColor", "enabled", "pvName"]),
    ("choicebutton", Base::PvWidget, &[
        "pvName", "height", "width", "items", "selectedColor", "itemsFromPv",
        "foregroundColor", "backgroundColor", "horizontal", "enabled", "font",
    ]),
    ("databrowser", Base::PvWidget, &["plt", "selectionValuePv", "showToolbar", "visible"]),
    ("demoImage", Base::Widget, &["macros", "backgroundColor"]),
    ("device", Base::Widget, &["deviceName", "name"]),
    ("display", Base::Widget, &[
        "children", "overflow", "backgroundColor", "border", "macros", "displayHeight",
        "autoZoomToFit",
    ]),
    ("drawer", Base::Widget, &[
        "anchor", "drawerWidth", "drawerMaxWidth", "font", "foregroundColor",
        "backgroundColor", "border", "text", "children",
    ]),
    ("dynamicpage", Base::Widget, &["location", "border", "showCloseButton", "scroll"]),
    ("dynamictabs", Base::Widget, &[
        "location", "maxHeight", "maxWidth", "minHeight", "border", "backgroundColor",
    ]),
    ("ellipse", Base::Widget, &[
        "gradient", "bgGradientColor", "fgGradientColor", "lineWidth", "lineColor",
        "transparent", "backgroundColor", "border", "horizontalFill", "fillLevel",
    ]),
    ("embeddedDisplay", Base::WidgetFirst, &[
        "file", "name", "scroll", "scalingOrigin", "overrideAutoZoomToFitValue",
    ]),
    ("groupbox", Base::WidgetFirst, &[
        "name", "children", "backgroundColor", "foregroundColor", "font", "transparent",
    ]),
    ("groupingcontainer", Base::WidgetFirst, &[
        "name", "children", "backgroundColor", "foregroundColor", "transparent", "macroMap",
    ]),
    ("image", Base::Widget, &[
        "imageFile", "macros", "alt", "stretchToFit", "fitToWidth", "fitToHeight", "rotation",
        "flipHorizontal", "flipVertical", "overflow",
    ]),
    ("input", Base::PvWidget, &[
        "pvName", "font", "foregroundColor", "backgroundColor", "transparent", "alarmSensitive",
        "enabled", "textAlign", "textAlignV", "border", "multiLine", "precision", "formatType",
        "showUnits", "precisionFromPv",
    ]),
    ("label", Base::Widget, &[
        "macros", "text", "visible", "transparent", "className", "textAlign", "textAlignV",
        "font", "foregroundColor", "backgroundColor", "border", "rotationStep", "wrapWords",
    ]),
    ("led", Base::PvWidget, &[
        "width", "height", "onColor", "offColor", "lineColor", "alarmSensitive", "bit",
        "square",
    ]),
    ("line", Base::PvWidget, &[
        "width", "height", "points", "lineWidth", "backgroundColor", "visible", "transparent",
        "rotationAngle", "arrows", "arrowLength",
    ]),
    ("linearmeter", Base::PvWidget, &[
        "minimum", "maximum", "format", "limitsFromPv", "displayHorizontal", "font",
        "scaleVisible", "showUnits", "showLimits", "levelHihi", "levelHigh", "levelLow",
        "levelLolo", "needleWidth", "knobSize", "colors",
    ]),
    ("menubutton", Base::PvWidget, &[
        "pvName", "foregroundColor", "backgroundColor", "font", "enabled", "actions",
        "readonly", "actionsFromPv", "label", "items", "itemsFromPv",
    ]),
    ("meter", Base::PvWidget, &[
        "minimum", "maximum", "limitsFromPv", "format", "foregroundColor", "backgroundColor",
        "needleColor", "precision", "font", "transparent", "showUnits", "showValue", "width",
        "height",
    ]),
    ("navigationtabs", Base::Widget, &[
        "tabs", "direction", "visible", "tabWidth", "tabHeight", "tabSpacing",
        "selectedColor", "deselectedColor", "font", "activeTab",
    ]),
    ("pngsymbol", Base::PvWidget, &["imageFile", "imageIndex", "stretchToFit"]),
    ("polygon", Base::Widget, &[
        "macros", "height", "width", "border", "lineWidth", "lineColor", "backgroundColor",
        "points", "rotationAngle", "transparent",
    ]),
    ("progressbar", Base::PvWidget, &[
        "min", "max", "limitsFromPv", "logScale", "horizontal", "showLabel", "fillColor",
        "backgroundColor", "precision", "font", "border", "transparent",
    ]),
    ("readback", Base::PvWidget, &[
        "precision", "formatType", "showUnits", "precisionFromPv", "alarmSensitive", "text",
        "textAlign", "textAlignV", "transparent", "font", "foregroundColor", "backgroundColor",
        "border", "rotationAngle", "visible", "wrapWords",
    ]),
    ("shape", Base::Widget, &[
        "pvName", "shapeWidth", "shapeHeight", "shapeTransform", "cornerWidth",
        "cornerHeight", "transparent", "backgroundColor", "border",
    ]),
    ("slidecontrol", Base::PvWidget, &[
        "minimum", "maximum", "limitsFromPv", "logScale", "horizontal", "showLabel",
        "foregroundColor", "backgroundColor", "precision", "font", "border", "enabled",
        "transparent", "levelHihi", "levelHigh", "levelLow", "levelLolo", "showScale",
        "showHihi", "showHigh", "showLow", "showLolo", "increment", "majorTickStepHint",
        "width", "height",
    ]),
    ("stripchart", Base::PvWidget, &[
        "traces", "axes", "start", "end", "foregroundColor", "backgroundColor", "showGrid",
        "title", "titleFont", "labelFont", "scaleFont", "showLegend", "showToolbar", "visible",
        "bufferSize", "updatePeriod",
    ]),
    ("symbol", Base::PvWidget, &[
        "imageFile", "symbols", "alt", "backgroundColor", "showBooleanLabel", "labelPosition",
        "border", "rotation", "flipHorizontal", "flipVertical", "visible", "stretchToFit",
        "actions", "font", "initialIndex", "showIndex", "arrayIndex", "enabled",
        "fallbackSymbol", "transparent",
    ]),
    ("tabcontainer", Base::Widget, &[
        "tabs", "backgroundColor", "activeTab", "direction", "tabHeight", "font", "children",
        "width", "height",
    ]),
    ("tank", Base::PvWidget, &[
        "minimum", "maximum", "limitsFromPv", "logScale", "horizontal", "showLabel",
        "emptyColor", "fillColor", "backgroundColor", "precision", "font", "border",
        "transparent", "scaleVisible", "showUnits",
    ]),
    ("thermometer", Base::PvWidget, &[
        "min", "max", "height", "width", "limitsFromPv", "fillColor", "alarmSensitive",
    ]),
    ("webcam", Base::Widget, &["name", "url"]),
    ("xyplot", Base::PvWidget, &[
        "traces", "axes", "xAxis", "plotBackgroundColor", "title", "titleFont", "showLegend",
        "showPlotBorder", "showToolbar", "visible", "backgroundColor", "foregroundColor",
        "scaleFont", "labelFont",
    ]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_fall_back_to_shape() {
        let registry = WidgetRegistry::standard();
        let (kind, schema) = registry.resolve("org.example.Mystery");
        assert_eq!(kind, FALLBACK_KIND);
        assert!(schema.is_some_and(|schema| schema.contains("backgroundColor")));
    }

    #[test]
    fn schemas_keep_declaration_order() {
        let registry = WidgetRegistry::standard();
        let label: Vec<_> = registry.get("label").unwrap().iter().take(3).collect();
        assert_eq!(label, ["macros", "text", "visible"]);
        let group: Vec<_> = registry.get("groupbox").unwrap().iter().take(2).collect();
        assert_eq!(group, ["position", "rules"]);
        assert!(registry.get("readback").unwrap().contains("pvMetadataList"));
        assert!(!registry.get("label").unwrap().contains("pvMetadataList"));
    }

    #[test]
    fn custom_kinds_can_be_registered() {
        let mut registry = WidgetRegistry::new();
        registry.register("gauge", &["needleColor"]);
        assert!(registry.get("gauge").unwrap().contains("tooltip"));
        let (kind, schema) = registry.resolve("other");
        assert_eq!(kind, FALLBACK_KIND);
        assert!(schema.is_none());
    }
}
