// src/config.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fetch strategy for the widget: query a live provider on every load, or
/// read an immutable content-addressed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Live,
    Snapshot,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Live, Mode::Snapshot];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Live => write!(f, "Live"),
            Mode::Snapshot => write!(f, "Snapshot"),
        }
    }
}

/// Named live-query providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvider {
    Dune,
    Custom,
}

impl DataProvider {
    pub const ALL: [DataProvider; 2] = [DataProvider::Dune, DataProvider::Custom];
}

impl fmt::Display for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataProvider::Dune => write!(f, "Dune"),
            DataProvider::Custom => write!(f, "Custom"),
        }
    }
}

/// Reference to a static snapshot payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRef {
    pub cid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-column display options. Columns are matched to row fields by `name`;
/// a column missing from the fetched rows renders blank cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_content: Option<ColumnAlign>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_type: Option<String>,
    pub is_hidden: bool,
    pub colored_negative_values: bool,
    pub colored_positive_values: bool,
}

impl ColumnSpec {
    pub fn named(name: impl Into<String>) -> Self {
        ColumnSpec {
            name: name.into(),
            ..ColumnSpec::default()
        }
    }

    pub fn is_progress_bar(&self) -> bool {
        self.kind.as_deref() == Some("progressbar")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub columns: Vec<ColumnSpec>,
}

impl TableOptions {
    /// Plain column list derived from fetched column names, used when the
    /// widget has data but no configured options yet.
    pub fn from_column_names(names: &[String]) -> Self {
        TableOptions {
            columns: names.iter().map(ColumnSpec::named).collect(),
        }
    }
}

/// The persisted widget configuration. Serialized camelCase to stay
/// compatible with configurations produced by the hosting builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataProvider>,
    pub query_id: String,
    pub api_endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
    pub mode: Mode,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<TableOptions>,
}

impl TableConfig {
    /// Initial configuration for a freshly placed widget.
    pub fn default_data() -> Self {
        TableConfig {
            data_source: Some(DataProvider::Dune),
            mode: Mode::Live,
            ..TableConfig::default()
        }
    }

    /// Seed configuration the builder surface overlays incoming data onto.
    pub fn default_builder() -> Self {
        TableConfig {
            data_source: Some(DataProvider::Dune),
            query_id: "2030664".to_string(),
            mode: Mode::Live,
            title: "Ethereum Beacon Chain Deposits Entity".to_string(),
            options: Some(TableOptions {
                columns: vec![
                    ColumnSpec {
                        title: Some("Entity".to_string()),
                        ..ColumnSpec::named("entity")
                    },
                    ColumnSpec {
                        title: Some("ETH Deposited".to_string()),
                        kind: Some("progressbar".to_string()),
                        number_format: Some("0,0.00a".to_string()),
                        ..ColumnSpec::named("eth_deposited")
                    },
                    ColumnSpec {
                        title: Some("Depositors".to_string()),
                        ..ColumnSpec::named("depositors")
                    },
                ],
            }),
            ..TableConfig::default()
        }
    }

    pub fn cid(&self) -> Option<&str> {
        self.file
            .as_ref()
            .map(|f| f.cid.as_str())
            .filter(|cid| !cid.is_empty())
    }
}

/// Style/theme override bag, distinct from the table's data configuration.
/// All fields optional; merging overwrites only the fields present. The
/// `parent_*` fields carry overrides inherited from the hosting page and are
/// only consulted when the widget has no custom override of its own.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_font_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_background_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_active_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_active_font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_shadow: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_font_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_custom_font_color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_custom_background_color: Option<bool>,
}

macro_rules! merge_fields {
    ($dst:expr, $src:expr, $($field:ident),+ $(,)?) => {
        $(if $src.$field.is_some() {
            $dst.$field = $src.$field.clone();
        })+
    };
}

impl Tag {
    /// Field-merge: fields present in `patch` overwrite, absent fields keep
    /// their prior values.
    pub fn merge(&mut self, patch: &Tag) {
        merge_fields!(
            self,
            patch,
            font_color,
            custom_font_color,
            background_color,
            custom_background_color,
            progress_background_color,
            footer_background_color,
            footer_font_color,
            pagination_active_background_color,
            pagination_active_font_color,
            header_background_color,
            header_font_color,
            width,
            height,
            dark_shadow,
            parent_font_color,
            parent_custom_font_color,
            parent_background_color,
            parent_custom_background_color,
        );
    }

    /// Adopt the inherited variants from the hosting page's tag. Only the
    /// parent fields change; the widget's own overrides stay untouched.
    pub fn set_from_parent(&mut self, parent: &Tag) {
        self.parent_font_color = parent.font_color.clone();
        self.parent_custom_font_color = parent.custom_font_color;
        self.parent_background_color = parent.background_color.clone();
        self.parent_custom_background_color = parent.custom_background_color;
    }
}
