use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use merx_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ValueObject};
use merx_events::{Command, Event};

/// Attribute registry identifier (one registry per installation).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryId(pub AggregateId);

impl RegistryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RegistryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The kinds of reusable descriptive values variants draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Color,
    Material,
    Size,
    Finish,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Color => "color",
            AttributeKind::Material => "material",
            AttributeKind::Size => "size",
            AttributeKind::Finish => "finish",
        }
    }
}

/// A reusable descriptive value. `code` is the display code (a hex color),
/// populated for colors only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub name: String,
    pub code: Option<String>,
}

impl ValueObject for AttributeValue {}

/// Display codes for common color names, used when the editor supplies none.
const WELL_KNOWN_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("red", "#FF0000"),
    ("blue", "#0000FF"),
    ("navy", "#000080"),
    ("green", "#008000"),
    ("yellow", "#FFFF00"),
    ("orange", "#FFA500"),
    ("brown", "#8B4513"),
    ("beige", "#F5F5DC"),
    ("cream", "#FFFDD0"),
    ("pink", "#FFC0CB"),
    ("purple", "#800080"),
    ("silver", "#C0C0C0"),
    ("gold", "#FFD700"),
    ("charcoal", "#36454F"),
    ("ivory", "#FFFFF0"),
    ("tan", "#D2B48C"),
];

/// Look up the default display code for a well-known color name.
pub fn default_code_for(name: &str) -> Option<&'static str> {
    WELL_KNOWN_COLORS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Aggregate root: AttributeRegistry.
///
/// Values are created on first use by an editor and never deleted; iteration
/// order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRegistry {
    id: RegistryId,
    colors: Vec<AttributeValue>,
    materials: Vec<AttributeValue>,
    sizes: Vec<AttributeValue>,
    finishes: Vec<AttributeValue>,
    version: u64,
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn empty(id: RegistryId) -> Self {
        Self {
            id,
            colors: Vec::new(),
            materials: Vec::new(),
            sizes: Vec::new(),
            finishes: Vec::new(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> RegistryId {
        self.id
    }

    /// Known values for a kind, in insertion order.
    pub fn values(&self, kind: AttributeKind) -> &[AttributeValue] {
        match kind {
            AttributeKind::Color => &self.colors,
            AttributeKind::Material => &self.materials,
            AttributeKind::Size => &self.sizes,
            AttributeKind::Finish => &self.finishes,
        }
    }

    /// Case-insensitive lookup of a stored value.
    pub fn find(&self, kind: AttributeKind, name: &str) -> Option<&AttributeValue> {
        let name = name.trim();
        self.values(kind)
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    fn entries_mut(&mut self, kind: AttributeKind) -> &mut Vec<AttributeValue> {
        match kind {
            AttributeKind::Color => &mut self.colors,
            AttributeKind::Material => &mut self.materials,
            AttributeKind::Size => &mut self.sizes,
            AttributeKind::Finish => &mut self.finishes,
        }
    }
}

impl AggregateRoot for AttributeRegistry {
    type Id = RegistryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: DefineValue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineValue {
    pub registry_id: RegistryId,
    pub kind: AttributeKind,
    pub name: String,
    pub code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeCommand {
    DefineValue(DefineValue),
}

impl Command for AttributeCommand {
    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            AttributeCommand::DefineValue(cmd) => cmd.registry_id.0,
        }
    }
}

/// Event: ValueDefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDefined {
    pub registry_id: RegistryId,
    pub kind: AttributeKind,
    pub name: String,
    pub code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeEvent {
    ValueDefined(ValueDefined),
}

impl Event for AttributeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AttributeEvent::ValueDefined(_) => "attributes.value.defined",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AttributeEvent::ValueDefined(e) => e.occurred_at,
        }
    }
}

impl Aggregate for AttributeRegistry {
    type Command = AttributeCommand;
    type Event = AttributeEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AttributeEvent::ValueDefined(e) => {
                let value = AttributeValue {
                    name: e.name.clone(),
                    code: e.code.clone(),
                };
                self.entries_mut(e.kind).push(value);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AttributeCommand::DefineValue(cmd) => self.handle_define(cmd),
        }
    }
}

impl AttributeRegistry {
    fn ensure_registry_id(&self, registry_id: RegistryId) -> Result<(), DomainError> {
        if self.id != registry_id {
            return Err(DomainError::invariant("registry_id mismatch"));
        }
        Ok(())
    }

    fn handle_define(&self, cmd: &DefineValue) -> Result<Vec<AttributeEvent>, DomainError> {
        self.ensure_registry_id(cmd.registry_id)?;

        let name = cmd.name.trim();

        // Blank input after trimming is a silent no-op; the registry must
        // never contain empty placeholder values.
        if name.is_empty() {
            return Ok(vec![]);
        }

        // Idempotent create: a case-insensitive match means the value already
        // exists, so there is nothing to record.
        if self.find(cmd.kind, name).is_some() {
            return Ok(vec![]);
        }

        // Display codes apply to colors only; a missing code falls back to
        // the well-known table.
        let code = match cmd.kind {
            AttributeKind::Color => cmd
                .code
                .clone()
                .or_else(|| default_code_for(name).map(str::to_owned)),
            _ => None,
        };

        Ok(vec![AttributeEvent::ValueDefined(ValueDefined {
            registry_id: cmd.registry_id,
            kind: cmd.kind,
            name: name.to_owned(),
            code,
            occurred_at: cmd.occurred_at,
        })])
    }
}
