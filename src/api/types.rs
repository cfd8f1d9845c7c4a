//! Wire types shared by the remote chart API and the services

use crate::error::{AppError, Result};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Chart kinds the generator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[serde(alias = "折线图")]
    Line,
    #[serde(alias = "柱状图")]
    Bar,
    #[serde(alias = "堆叠图")]
    Stacked,
    #[serde(alias = "饼图")]
    Pie,
    #[serde(alias = "雷达图")]
    Radar,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Stacked,
        ChartType::Pie,
        ChartType::Radar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Stacked => "stacked",
            ChartType::Pie => "pie",
            ChartType::Radar => "radar",
        }
    }

    fn legacy_label(&self) -> &'static str {
        match self {
            ChartType::Line => "折线图",
            ChartType::Bar => "柱状图",
            ChartType::Stacked => "堆叠图",
            ChartType::Pie => "饼图",
            ChartType::Radar => "雷达图",
        }
    }
}

impl FromStr for ChartType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s) || t.legacy_label() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown chart type '{}'", s)))
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uploaded dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DatasetFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read a dataset from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Validation(format!("Invalid dataset path: {:?}", path)))?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Validation failure tied to one request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn required(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// A chart generation request as entered by the user
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub goal: String,
    pub name: String,
    pub chart_type: Option<ChartType>,
    pub file: Option<DatasetFile>,
}

impl ChartRequest {
    pub fn new(goal: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            name: name.into(),
            chart_type: None,
            file: None,
        }
    }

    pub fn with_chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    pub fn with_file(mut self, file: DatasetFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Field-level checks, run before anything is sent
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.goal.trim().is_empty() {
            errors.push(FieldError::required("goal", "Please enter an analysis goal"));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::required("name", "Please enter a chart name"));
        }
        if self.file.is_none() {
            errors.push(FieldError::required("file", "Please upload a dataset"));
        }
        errors
    }

    /// Split into the structured fields and the attachment
    pub fn into_payload(
        self,
    ) -> std::result::Result<(GenChartParams, DatasetFile), Vec<FieldError>> {
        let errors = self.validate();
        match self.file {
            Some(file) if errors.is_empty() => Ok((
                GenChartParams {
                    goal: self.goal,
                    name: self.name,
                    chart_type: self.chart_type,
                },
                file,
            )),
            _ => Err(errors),
        }
    }
}

/// Structured fields of a generation call; the dataset travels separately
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenChartParams {
    pub goal: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
}

/// Result of a synchronous generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    pub gen_chart: Option<String>,
    pub gen_result: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub chart_id: Option<String>,
}

/// Acknowledgement of a deferred generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgement {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub chart_id: Option<String>,
}

/// A chart record owned by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub gen_chart: Option<String>,
    #[serde(default)]
    pub gen_result: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub exec_message: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl ChartRecord {
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.create_time.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Listing query for "my charts"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub current: u64,
    pub page_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SearchParams {
    pub fn baseline(page_size: u64, sort_field: impl Into<String>, sort_order: SortOrder) -> Self {
        Self {
            current: 1,
            page_size,
            sort_field: Some(sort_field.into()),
            sort_order: Some(sort_order),
            name: None,
        }
    }

    /// Set the name filter; blank terms clear it
    pub fn with_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.name = (!name.is_empty()).then(|| name.to_string());
        self
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::baseline(4, "createTime", SortOrder::Desc)
    }
}

/// One page of the caller's chart records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub records: Vec<ChartRecord>,
    #[serde(default, deserialize_with = "u64_or_string")]
    pub total: u64,
}

/// Response envelope used by every endpoint
#[derive(Debug, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> BaseResponse<T> {
    /// Unwrap the payload; non-zero codes and missing data are errors
    pub fn into_data(self, operation: &str) -> Result<T> {
        if self.code != 0 {
            return Err(AppError::Remote {
                code: self.code,
                message: self
                    .message
                    .unwrap_or_else(|| format!("{} rejected", operation)),
            });
        }
        self.data
            .ok_or_else(|| AppError::EmptyResponse(operation.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(d).map(|v| v.map(String::from))
}

fn u64_or_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    match Option::<StringOrNumber>::deserialize(d)? {
        None => Ok(0),
        Some(StringOrNumber::Number(n)) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count {}", n))),
        Some(StringOrNumber::String(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<ChartRecord>, D::Error> {
    Ok(Option::<Vec<ChartRecord>>::deserialize(d)?.unwrap_or_default())
}
