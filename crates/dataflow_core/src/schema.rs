//! Field declarations of the Dataflow job resource and the typed spec built from them.
//!
//! Raw configuration arrives as a JSON object keyed by the field names in
//! [`FIELDS`]. [`DesiredJobSpec::from_config`] validates it once; everything
//! downstream works with the typed spec.

use crate::error::ValidationError;
use crate::params::{encode_parameters, json_type_name};
use crate::policy::TerminationPolicy;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod fields {
    pub const NAME: &str = "name";
    pub const GCS_PATH: &str = "gcs_path";
    pub const TEMP_LOCATION: &str = "temp_location";
    pub const ZONE: &str = "zone";
    pub const MAX_WORKERS: &str = "max_workers";
    pub const PARAMETERS: &str = "parameters";
    pub const ON_DELETE: &str = "on_delete";
    pub const PROJECT: &str = "project";
    pub const STATE: &str = "state";
}

pub const DEFAULT_MAX_WORKERS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    None,
    Int(i64),
    Str(&'static str),
}

/// Declaration of one resource attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Changing the value replaces the job instead of updating it.
    pub force_new: bool,
    /// Set by the reconciler, never by configuration.
    pub computed: bool,
    pub default: FieldDefault,
    pub allowed: Option<&'static [&'static str]>,
}

const fn field(name: &'static str, kind: FieldKind, required: bool) -> FieldSchema {
    FieldSchema {
        name,
        kind,
        required,
        force_new: true,
        computed: false,
        default: FieldDefault::None,
        allowed: None,
    }
}

pub const FIELDS: &[FieldSchema] = &[
    field(fields::NAME, FieldKind::String, true),
    field(fields::GCS_PATH, FieldKind::String, true),
    field(fields::TEMP_LOCATION, FieldKind::String, true),
    field(fields::ZONE, FieldKind::String, false),
    FieldSchema {
        default: FieldDefault::Int(DEFAULT_MAX_WORKERS),
        ..field(fields::MAX_WORKERS, FieldKind::Int, false)
    },
    field(fields::PARAMETERS, FieldKind::Map, false),
    FieldSchema {
        default: FieldDefault::Str("drain"),
        allowed: Some(TerminationPolicy::ALLOWED),
        ..field(fields::ON_DELETE, FieldKind::String, false)
    },
    field(fields::PROJECT, FieldKind::String, false),
    FieldSchema {
        name: fields::STATE,
        kind: FieldKind::String,
        required: false,
        force_new: false,
        computed: true,
        default: FieldDefault::None,
        allowed: None,
    },
];

pub fn field_schema(name: &str) -> Option<&'static FieldSchema> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Rejects `value` unless it is one of `allowed`.
pub fn validate_allowed_string_value(
    key: &str,
    value: &str,
    allowed: &'static [&'static str],
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }

    Err(ValidationError::NotAllowed {
        key: key.to_string(),
        allowed,
        value: value.to_string(),
    })
}

/// Desired configuration of a Dataflow template job.
///
/// Immutable once the job exists: any difference between two specs means the
/// job has to be replaced, see [`replacement_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredJobSpec {
    pub name: String,
    /// Cloud Storage path of the template, e.g. `gs://dataflow-templates/latest/Word_Count`.
    pub template_location: String,
    /// Cloud Storage path used for staging and temporary files.
    pub staging_location: String,
    pub zone: Option<String>,
    pub max_workers: i64,
    pub parameters: IndexMap<String, String>,
    pub on_delete: TerminationPolicy,
    /// Falls back to the provider default when unset.
    pub project: Option<String>,
}

impl DesiredJobSpec {
    /// A spec with the required fields set and everything else defaulted.
    pub fn new(
        name: impl Into<String>,
        template_location: impl Into<String>,
        staging_location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            template_location: template_location.into(),
            staging_location: staging_location.into(),
            zone: None,
            max_workers: DEFAULT_MAX_WORKERS,
            parameters: IndexMap::new(),
            on_delete: TerminationPolicy::default(),
            project: None,
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_max_workers(mut self, max_workers: i64) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_on_delete(mut self, policy: TerminationPolicy) -> Self {
        self.on_delete = policy;
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Builds a spec from a raw configuration object.
    ///
    /// Applies defaults, checks required fields, types and allowed values.
    /// `null` is treated the same as an absent key.
    pub fn from_config(raw: &Map<String, Value>) -> Result<Self, ValidationError> {
        for (key, value) in raw {
            let schema = field_schema(key).ok_or_else(|| ValidationError::UnknownField(key.clone()))?;
            if schema.computed && !value.is_null() {
                return Err(ValidationError::ComputedField(schema.name));
            }
        }

        let max_workers = match optional_int(raw, fields::MAX_WORKERS)? {
            Some(n) if n < 1 => {
                return Err(ValidationError::OutOfRange {
                    key: fields::MAX_WORKERS,
                    message: format!("must be at least 1, got {n}"),
                });
            }
            Some(n) => n,
            None => DEFAULT_MAX_WORKERS,
        };

        let on_delete = match optional_str(raw, fields::ON_DELETE)? {
            Some(policy) => {
                validate_allowed_string_value(fields::ON_DELETE, policy, TerminationPolicy::ALLOWED)?;
                policy.parse()?
            }
            None => TerminationPolicy::default(),
        };

        let parameters = match raw.get(fields::PARAMETERS) {
            None | Some(Value::Null) => IndexMap::new(),
            Some(Value::Object(map)) => encode_parameters(map)?,
            Some(other) => return Err(mismatch(fields::PARAMETERS, "map", other)),
        };

        Ok(Self {
            name: required_str(raw, fields::NAME)?.to_string(),
            template_location: required_str(raw, fields::GCS_PATH)?.to_string(),
            staging_location: required_str(raw, fields::TEMP_LOCATION)?.to_string(),
            zone: optional_str(raw, fields::ZONE)?.map(str::to_string),
            max_workers,
            parameters,
            on_delete,
            project: optional_str(raw, fields::PROJECT)?.map(str::to_string),
        })
    }
}

/// Raw names of the fields that differ between `old` and `new`.
///
/// Every field forces a new job, so a non-empty result means "replace".
pub fn replacement_fields(old: &DesiredJobSpec, new: &DesiredJobSpec) -> Vec<&'static str> {
    let changed = [
        (fields::NAME, old.name != new.name),
        (fields::GCS_PATH, old.template_location != new.template_location),
        (fields::TEMP_LOCATION, old.staging_location != new.staging_location),
        (fields::ZONE, old.zone != new.zone),
        (fields::MAX_WORKERS, old.max_workers != new.max_workers),
        // Order-insensitive.
        (fields::PARAMETERS, old.parameters != new.parameters),
        (fields::ON_DELETE, old.on_delete != new.on_delete),
        (fields::PROJECT, old.project != new.project),
    ];

    changed
        .into_iter()
        .filter(|(name, differs)| *differs && field_schema(name).is_some_and(|f| f.force_new))
        .map(|(name, _)| name)
        .collect()
}

fn mismatch(key: &str, expected: &'static str, found: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: json_type_name(found),
    }
}

fn optional_str<'a>(raw: &'a Map<String, Value>, key: &'static str) -> Result<Option<&'a str>, ValidationError> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(mismatch(key, "string", other)),
    }
}

fn required_str<'a>(raw: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, ValidationError> {
    optional_str(raw, key)?.ok_or(ValidationError::MissingField(key))
}

fn optional_int(raw: &Map<String, Value>, key: &'static str) -> Result<Option<i64>, ValidationError> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| ValidationError::OutOfRange {
            key,
            message: format!("expected an integer, got {n}"),
        }),
        Some(other) => Err(mismatch(key, "int", other)),
    }
}
