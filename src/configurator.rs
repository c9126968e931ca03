// src/configurator.rs
//! The two configuration surfaces exposed to the hosting builder, their edit
//! actions as explicit command values, and the shareable-link encoding.
//!
//! Commands carry before-snapshots and expose `execute`/`undo` as pure
//! transitions over owned configuration values; the host's undo engine
//! sequences the calls. There is no `redo`: hosts re-invoke `execute`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{DataProvider, FileRef, Mode, TableConfig, TableOptions, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTarget {
    Builders,
    Embedders,
}

#[derive(Debug, Clone)]
pub struct Configurator {
    pub name: &'static str,
    pub target: ConfigTarget,
}

/// Both configuration surfaces, in the order the hosting builder lists them.
pub fn configurators() -> Vec<Configurator> {
    vec![
        Configurator::for_target(ConfigTarget::Builders),
        Configurator::for_target(ConfigTarget::Embedders),
    ]
}

impl Configurator {
    pub fn for_target(target: ConfigTarget) -> Self {
        let name = match target {
            ConfigTarget::Builders => "Builder Configurator",
            ConfigTarget::Embedders => "Embedder Configurator",
        };
        Configurator { name, target }
    }

    /// The named edit actions this surface offers. The builder surface also
    /// carries the advanced per-column options schema; its presence changes
    /// how the Edit command applies and undoes general settings.
    pub fn actions(&self, column_names: &[String]) -> Vec<ActionSpec> {
        let (form, advanced) = match self.target {
            ConfigTarget::Builders => {
                let schema = builder_schema(column_names);
                (schema.form, Some(schema.advanced))
            }
            ConfigTarget::Embedders => (embedder_schema(), None),
        };
        vec![
            ActionSpec {
                name: "Edit",
                icon: "edit",
                user_input_schema: Some(form),
                advanced_schema: advanced,
            },
            ActionSpec {
                name: "Data",
                icon: "database",
                user_input_schema: None,
                advanced_schema: None,
            },
        ]
    }
}

/// One edit action: either schema-driven (Edit) or backed by the custom
/// data-source surface (Data, no schema).
#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub name: &'static str,
    pub icon: &'static str,
    pub user_input_schema: Option<FormSchema>,
    pub advanced_schema: Option<FormSchema>,
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    pub data_schema: Value,
    pub ui_schema: Value,
}

pub struct BuilderSchema {
    pub form: FormSchema,
    pub advanced: FormSchema,
}

fn general_properties() -> Value {
    json!({
        "title": { "type": "string" },
        "description": { "type": "string" }
    })
}

fn theme_properties() -> Value {
    json!({
        "darkShadow": { "type": "boolean" },
        "customFontColor": { "type": "boolean" },
        "fontColor": { "type": "string", "format": "color" },
        "customBackgroundColor": { "type": "boolean" },
        "backgroundColor": { "type": "string", "format": "color" },
        "progressBackgroundColor": { "type": "string", "format": "color" },
        "headerBackgroundColor": { "type": "string", "format": "color" },
        "headerFontColor": { "type": "string", "format": "color" },
        "footerBackgroundColor": { "type": "string", "format": "color" },
        "footerFontColor": { "type": "string", "format": "color" },
        "paginationActiveBackgroundColor": { "type": "string", "format": "color" },
        "paginationActiveFontColor": { "type": "string", "format": "color" },
        "height": { "type": "number" }
    })
}

fn form_ui_schema() -> Value {
    json!({
        "type": "Categorization",
        "elements": [
            {
                "type": "Category",
                "label": "General",
                "elements": [
                    { "type": "Control", "scope": "#/properties/title" },
                    { "type": "Control", "scope": "#/properties/description" }
                ]
            },
            {
                "type": "Category",
                "label": "Theme",
                "elements": [
                    { "type": "Control", "scope": "#/properties/darkShadow" },
                    { "type": "Control", "scope": "#/properties/customFontColor" },
                    { "type": "Control", "scope": "#/properties/fontColor" },
                    { "type": "Control", "scope": "#/properties/customBackgroundColor" },
                    { "type": "Control", "scope": "#/properties/backgroundColor" },
                    { "type": "Control", "scope": "#/properties/headerBackgroundColor" },
                    { "type": "Control", "scope": "#/properties/headerFontColor" },
                    { "type": "Control", "scope": "#/properties/footerBackgroundColor" },
                    { "type": "Control", "scope": "#/properties/footerFontColor" },
                    { "type": "Control", "scope": "#/properties/height" }
                ]
            }
        ]
    })
}

/// Schema set for the builder surface. The advanced schema drives the
/// per-column options form and enumerates the currently fetched column names.
pub fn builder_schema(column_names: &[String]) -> BuilderSchema {
    let mut properties = general_properties();
    if let (Value::Object(props), Value::Object(theme)) = (&mut properties, theme_properties()) {
        props.extend(theme);
    }
    let form = FormSchema {
        data_schema: json!({ "type": "object", "properties": properties }),
        ui_schema: form_ui_schema(),
    };
    let advanced = FormSchema {
        data_schema: json!({
            "type": "object",
            "properties": {
                "columns": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "enum": column_names },
                            "title": { "type": "string" },
                            "alignContent": {
                                "type": "string",
                                "enum": ["left", "center", "right"]
                            },
                            "type": {
                                "type": "string",
                                "enum": ["normal", "progressbar"]
                            },
                            "numberFormat": { "type": "string" },
                            "dateFormat": { "type": "string" },
                            "dateType": { "type": "string" },
                            "isHidden": { "type": "boolean" },
                            "coloredNegativeValues": { "type": "boolean" },
                            "coloredPositiveValues": { "type": "boolean" }
                        },
                        "required": ["name"]
                    }
                }
            }
        }),
        ui_schema: json!({
            "type": "VerticalLayout",
            "elements": [
                { "type": "Control", "scope": "#/properties/columns" }
            ]
        }),
    };
    BuilderSchema { form, advanced }
}

pub fn embedder_schema() -> FormSchema {
    FormSchema {
        data_schema: json!({ "type": "object", "properties": general_properties() }),
        ui_schema: json!({
            "type": "VerticalLayout",
            "elements": [
                { "type": "Control", "scope": "#/properties/title" },
                { "type": "Control", "scope": "#/properties/description" }
            ]
        }),
    }
}

/// Builder-surface `set_data`: incoming fields overlay the default builder
/// configuration, shallowly, the way the original seeds new placements.
pub fn with_builder_defaults(data: &TableConfig) -> TableConfig {
    match serde_json::to_value(data) {
        Ok(patch) => shallow_merge(&TableConfig::default_builder(), patch)
            .unwrap_or_else(|_| data.clone()),
        Err(_) => data.clone(),
    }
}

/// Form submission for the Edit action: general settings plus a theme patch.
#[derive(Debug, Clone, Default)]
pub struct EditInput {
    pub title: String,
    pub description: String,
    pub theme: Tag,
}

/// The Edit action as a command value. `execute` applies the general
/// settings (merged when the surface carries an advanced schema, wholesale
/// otherwise) and field-merges the theme patch into the tag; `undo` restores
/// the snapshots, preserving the options edited through the Data action when
/// the advanced schema is present.
#[derive(Debug, Clone)]
pub struct EditCommand {
    before_config: TableConfig,
    before_tag: Tag,
    input: EditInput,
    has_advanced: bool,
}

impl EditCommand {
    pub fn new(config: &TableConfig, tag: &Tag, input: EditInput, has_advanced: bool) -> Self {
        EditCommand {
            before_config: config.clone(),
            before_tag: tag.clone(),
            input,
            has_advanced,
        }
    }

    pub fn execute(&self) -> (TableConfig, Tag) {
        let config = if self.has_advanced {
            TableConfig {
                title: self.input.title.clone(),
                description: self.input.description.clone(),
                ..self.before_config.clone()
            }
        } else {
            TableConfig {
                title: self.input.title.clone(),
                description: self.input.description.clone(),
                ..TableConfig::default()
            }
        };
        let mut tag = self.before_tag.clone();
        tag.merge(&self.input.theme);
        (config, tag)
    }

    pub fn undo(&self, current: &TableConfig) -> (TableConfig, Tag) {
        let mut config = self.before_config.clone();
        if self.has_advanced {
            config.options = current.options.clone();
        }
        (config, self.before_tag.clone())
    }
}

/// Submission from the Data action's custom surface. Absent fields keep
/// their prior values; `options` distinguishes "leave alone" (`None`) from
/// "set, possibly clearing" (`Some(..)`).
#[derive(Debug, Clone, Default)]
pub struct DataInput {
    pub mode: Option<Mode>,
    pub file: Option<FileRef>,
    pub data_source: Option<DataProvider>,
    pub query_id: Option<String>,
    pub api_endpoint: Option<String>,
    pub options: Option<Option<TableOptions>>,
}

#[derive(Debug, Clone)]
pub struct DataCommand {
    before: TableConfig,
    input: DataInput,
}

impl DataCommand {
    pub fn new(config: &TableConfig, input: DataInput) -> Self {
        DataCommand {
            before: config.clone(),
            input,
        }
    }

    pub fn execute(&self) -> TableConfig {
        let mut config = self.before.clone();
        if let Some(mode) = self.input.mode {
            config.mode = mode;
        }
        if let Some(file) = &self.input.file {
            config.file = Some(file.clone());
        }
        if let Some(data_source) = self.input.data_source {
            config.data_source = Some(data_source);
        }
        if let Some(query_id) = &self.input.query_id {
            config.query_id = query_id.clone();
        }
        if let Some(api_endpoint) = &self.input.api_endpoint {
            config.api_endpoint = api_endpoint.clone();
        }
        if let Some(options) = &self.input.options {
            config.options = options.clone();
        }
        config
    }

    pub fn undo(&self) -> TableConfig {
        self.before.clone()
    }
}

/// Confirmation gate for the Data surface: live mode needs a provider,
/// snapshot mode a content identifier. A failing check silently refuses.
pub fn can_confirm(mode: Mode, data_source: Option<DataProvider>, cid: Option<&str>) -> bool {
    match mode {
        Mode::Live => data_source.is_some(),
        Mode::Snapshot => cid.is_some_and(|cid| !cid.is_empty()),
    }
}

/// Shareable-link payload: the full configuration as base64-encoded JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParams {
    pub data: String,
}

#[derive(Debug, Error)]
pub enum LinkParamsError {
    #[error("link payload is not valid percent-encoded utf-8: {0}")]
    Percent(#[from] std::str::Utf8Error),
    #[error("link payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("link payload is not a valid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn link_params(config: &TableConfig) -> Result<LinkParams, LinkParamsError> {
    let json = serde_json::to_string(config)?;
    Ok(LinkParams {
        data: BASE64.encode(json),
    })
}

/// Reverse of [`link_params`]: percent-decode, base64-decode, JSON-parse,
/// then shallow-merge onto the current configuration. Decode failures
/// propagate to the caller; handling them is the host's responsibility.
pub fn apply_link_params(
    current: &TableConfig,
    params: &LinkParams,
) -> Result<TableConfig, LinkParamsError> {
    let unescaped = percent_decode_str(&params.data).decode_utf8()?.into_owned();
    let bytes = BASE64.decode(unescaped.as_bytes())?;
    let patch: Value = serde_json::from_slice(&bytes)?;
    Ok(shallow_merge(current, patch)?)
}

/// Shallow top-level merge of a JSON patch onto a configuration. Relies on
/// absent optional fields being skipped during serialization, which gives
/// the patch the same key set a JS object spread would see.
fn shallow_merge(base: &TableConfig, patch: Value) -> Result<TableConfig, serde_json::Error> {
    let mut merged = serde_json::to_value(base)?;
    if let (Value::Object(merged), Value::Object(patch)) = (&mut merged, patch) {
        for (key, value) in patch {
            merged.insert(key, value);
        }
    }
    serde_json::from_value(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnSpec;

    fn config_with_options() -> TableConfig {
        TableConfig {
            data_source: Some(DataProvider::Dune),
            query_id: "q1".to_string(),
            title: "before".to_string(),
            options: Some(TableOptions {
                columns: vec![ColumnSpec::named("a")],
            }),
            ..TableConfig::default()
        }
    }

    #[test]
    fn edit_execute_merges_with_advanced_schema() {
        let config = config_with_options();
        let command = EditCommand::new(
            &config,
            &Tag::default(),
            EditInput {
                title: "after".to_string(),
                description: "desc".to_string(),
                theme: Tag::default(),
            },
            true,
        );
        let (next, _) = command.execute();
        assert_eq!(next.title, "after");
        assert_eq!(next.query_id, "q1");
        assert!(next.options.is_some());
    }

    #[test]
    fn edit_execute_replaces_wholesale_without_advanced_schema() {
        let config = config_with_options();
        let command = EditCommand::new(
            &config,
            &Tag::default(),
            EditInput {
                title: "after".to_string(),
                ..EditInput::default()
            },
            false,
        );
        let (next, _) = command.execute();
        assert_eq!(next.title, "after");
        assert_eq!(next.query_id, "");
        assert!(next.data_source.is_none());
        assert!(next.options.is_none());
    }

    #[test]
    fn edit_applies_theme_patch_to_tag() {
        let tag = Tag {
            height: Some(500.0),
            ..Tag::default()
        };
        let command = EditCommand::new(
            &TableConfig::default(),
            &tag,
            EditInput {
                theme: Tag {
                    dark_shadow: Some(true),
                    ..Tag::default()
                },
                ..EditInput::default()
            },
            false,
        );
        let (_, next_tag) = command.execute();
        assert_eq!(next_tag.height, Some(500.0));
        assert_eq!(next_tag.dark_shadow, Some(true));
    }

    #[test]
    fn edit_undo_preserves_current_options_with_advanced_schema() {
        let config = config_with_options();
        let command = EditCommand::new(&config, &Tag::default(), EditInput::default(), true);
        // options changed through the Data action after the edit
        let current = TableConfig {
            options: Some(TableOptions {
                columns: vec![ColumnSpec::named("b")],
            }),
            ..command.execute().0
        };
        let (restored, _) = command.undo(&current);
        assert_eq!(restored.title, "before");
        assert_eq!(restored.options.as_ref().unwrap().columns[0].name, "b");
    }

    #[test]
    fn edit_undo_restores_options_without_advanced_schema() {
        let config = config_with_options();
        let command = EditCommand::new(&config, &Tag::default(), EditInput::default(), false);
        let current = TableConfig::default();
        let (restored, _) = command.undo(&current);
        assert_eq!(restored.options.as_ref().unwrap().columns[0].name, "a");
    }

    #[test]
    fn data_execute_merges_only_present_fields() {
        let config = config_with_options();
        let command = DataCommand::new(
            &config,
            DataInput {
                mode: Some(Mode::Snapshot),
                file: Some(FileRef {
                    cid: "bafy".to_string(),
                }),
                ..DataInput::default()
            },
        );
        let next = command.execute();
        assert_eq!(next.mode, Mode::Snapshot);
        assert_eq!(next.cid(), Some("bafy"));
        // absent fields keep their prior values
        assert_eq!(next.query_id, "q1");
        assert_eq!(next.data_source, Some(DataProvider::Dune));
        assert!(next.options.is_some());

        assert_eq!(command.undo(), config);
    }

    #[test]
    fn data_execute_can_clear_options() {
        let config = config_with_options();
        let command = DataCommand::new(
            &config,
            DataInput {
                options: Some(None),
                ..DataInput::default()
            },
        );
        assert!(command.execute().options.is_none());
    }

    #[test]
    fn confirm_validation_per_mode() {
        assert!(can_confirm(Mode::Live, Some(DataProvider::Dune), None));
        assert!(!can_confirm(Mode::Live, None, Some("bafy")));
        assert!(can_confirm(Mode::Snapshot, None, Some("bafy")));
        assert!(!can_confirm(Mode::Snapshot, Some(DataProvider::Dune), None));
        assert!(!can_confirm(Mode::Snapshot, None, Some("")));
    }

    #[test]
    fn link_params_round_trip() {
        let config = config_with_options();
        let params = link_params(&config).unwrap();
        let merged = apply_link_params(&TableConfig::default(), &params).unwrap();
        assert_eq!(merged, config);
    }

    #[test]
    fn link_params_accept_percent_encoded_payload() {
        let config = config_with_options();
        let params = link_params(&config).unwrap();
        let escaped = params
            .data
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D");
        let merged =
            apply_link_params(&TableConfig::default(), &LinkParams { data: escaped }).unwrap();
        assert_eq!(merged, config);
    }

    #[test]
    fn malformed_link_payload_propagates() {
        let current = TableConfig::default();
        assert!(matches!(
            apply_link_params(
                &current,
                &LinkParams {
                    data: "!!not-base64!!".to_string()
                }
            ),
            Err(LinkParamsError::Base64(_))
        ));
        let not_json = LinkParams {
            data: BASE64.encode("not json"),
        };
        assert!(matches!(
            apply_link_params(&current, &not_json),
            Err(LinkParamsError::Json(_))
        ));
    }

    #[test]
    fn link_merge_is_shallow() {
        let current = TableConfig {
            description: "kept".to_string(),
            ..TableConfig::default()
        };
        let patch = TableConfig {
            title: "incoming".to_string(),
            ..TableConfig::default()
        };
        let merged = apply_link_params(&current, &link_params(&patch).unwrap()).unwrap();
        assert_eq!(merged.title, "incoming");
        // the patch serializes `description` (it is not optional), so the
        // top-level merge overwrites it
        assert_eq!(merged.description, "");
    }

    #[test]
    fn builder_set_data_overlays_defaults() {
        let incoming = TableConfig {
            title: "mine".to_string(),
            ..TableConfig::default()
        };
        let seeded = with_builder_defaults(&incoming);
        assert_eq!(seeded.title, "mine");
        // fields absent from the incoming config come from the builder seed
        assert_eq!(seeded.data_source, Some(DataProvider::Dune));
    }

    #[test]
    fn builder_actions_carry_advanced_schema() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let surfaces = configurators();
        let builder_actions = surfaces[0].actions(&columns);
        let edit = &builder_actions[0];
        assert_eq!(edit.name, "Edit");
        let advanced = edit.advanced_schema.as_ref().unwrap();
        let names = &advanced.data_schema["properties"]["columns"]["items"]["properties"]["name"]
            ["enum"];
        assert_eq!(names, &json!(["a", "b"]));

        let embedder_actions = surfaces[1].actions(&columns);
        assert!(embedder_actions[0].advanced_schema.is_none());
        assert_eq!(embedder_actions[1].name, "Data");
    }
}
