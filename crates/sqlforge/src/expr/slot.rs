use crate::data_type::{DataType, Field};
use crate::value::Value;
use std::sync::Arc;

/// Options attached to a value slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotOptions {
    /// Let any string through type validation (LIKE patterns).
    pub accept_strings: bool,
    /// Always inline the escaped literal, even when rendering with bound parameters.
    pub inline: bool,
}

impl SlotOptions {
    pub fn accept_strings() -> Self {
        Self {
            accept_strings: true,
            ..Self::default()
        }
    }

    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }
}

/// One value that must reach SQL through the dialect's escaping or binding.
///
/// Slots are immutable once created and are shared (`Arc`) between clones of
/// the composition that owns them.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    value: Value,
    data_type: Option<DataType>,
    field: Option<Arc<Field>>,
    options: SlotOptions,
}

impl Slot {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            data_type: None,
            field: None,
            options: SlotOptions::default(),
        }
    }

    /// A slot whose value is escaped as `data_type`.
    pub fn typed(value: impl Into<Value>, data_type: DataType) -> Self {
        Self::new(value).with_type(Some(data_type))
    }

    pub fn with_type(mut self, data_type: Option<DataType>) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_field(mut self, field: Arc<Field>) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_options(mut self, options: SlotOptions) -> Self {
        self.options = options;
        self
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The type the value is escaped as: the explicit type, else the field's.
    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type
            .as_ref()
            .or_else(|| self.field.as_ref().map(|f| &f.data_type))
    }

    pub fn field(&self) -> Option<&Arc<Field>> {
        self.field.as_ref()
    }

    pub fn options(&self) -> SlotOptions {
        self.options
    }
}
