use super::{Placeholder, Slot};
use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// One element of a [`Composition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Literal SQL text, emitted verbatim.
    Text(String),
    /// A value that goes through escaping or binding.
    Slot(Arc<Slot>),
    Placeholder(Placeholder),
}

/// Anything a composition accepts without checking.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Item(Item),
    /// Spliced in item by item, never nested.
    Composition(Composition),
}

/// Input of unknown shape, checked on admission.
///
/// Only [`Piece::Segment`] is admissible; a bare value is rejected with
/// [`QueryError::Composition`] carrying the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece {
    Segment(Segment),
    Value(Value),
}

impl Piece {
    fn admit(self) -> QueryResult<Segment> {
        match self {
            Piece::Segment(segment) => Ok(segment),
            Piece::Value(item) => Err(QueryError::composition(item)),
        }
    }
}

/// An ordered sequence of SQL text, value slots and placeholders.
///
/// Item order is token order. Cloning copies the sequence and shares the
/// (immutable) slots, so two clones can be extended independently.
///
/// ```ignore
/// use sqlforge::{Composition, Slot};
///
/// let mut c = Composition::text("\"age\" > ");
/// c.add(Slot::new(18)).add(" AND \"active\"");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    items: Vec<Item>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// A composition holding a single text item.
    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            items: vec![Item::Text(sql.into())],
        }
    }

    /// Bulk constructor, equivalent to calling [`add`](Self::add) for each segment.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let mut c = Self::new();
        for segment in segments {
            c.add(segment);
        }
        c
    }

    /// Checked bulk constructor for inputs of unknown shape.
    pub fn try_from_pieces<I>(pieces: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = Piece>,
    {
        let mut c = Self::new();
        for piece in pieces {
            c.try_add(piece)?;
        }
        Ok(c)
    }

    /// Append a segment.
    pub fn add(&mut self, segment: impl Into<Segment>) -> &mut Self {
        match segment.into() {
            Segment::Item(item) => self.items.push(item),
            Segment::Composition(other) => self.items.extend(other.items),
        }
        self
    }

    /// Append a piece, rejecting anything that is not a segment.
    pub fn try_add(&mut self, piece: impl Into<Piece>) -> QueryResult<&mut Self> {
        let segment = piece.into().admit()?;
        Ok(self.add(segment))
    }

    /// Insert a segment at the front.
    pub fn prepend(&mut self, segment: impl Into<Segment>) -> &mut Self {
        match segment.into() {
            Segment::Item(item) => self.items.insert(0, item),
            Segment::Composition(other) => {
                self.items.splice(0..0, other.items);
            }
        }
        self
    }

    /// Replace the whole content.
    pub fn set<I, S>(&mut self, segments: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        self.items.clear();
        for segment in segments {
            self.add(segment);
        }
        self
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when the composition would render to nothing.
    pub fn is_empty(&self) -> bool {
        self.items
            .iter()
            .all(|item| matches!(item, Item::Text(t) if t.is_empty()))
    }

    /// Names of the placeholders still present, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.items.iter().filter_map(|item| match item {
            Item::Placeholder(p) => Some(p),
            _ => None,
        })
    }

    /// Substitute every placeholder called `name` with `slot`.
    ///
    /// Returns how many were replaced.
    pub fn resolve(&mut self, name: &str, slot: Slot) -> usize {
        let slot = Arc::new(slot);
        let mut replaced = 0;
        for item in &mut self.items {
            if matches!(item, Item::Placeholder(p) if p.name() == name) {
                *item = Item::Slot(slot.clone());
                replaced += 1;
            }
        }
        replaced
    }

    /// Iterate over the text items only.
    pub(crate) fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            Item::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }
}

/// Debug-oriented rendering: slots print as `?`, placeholders as `:name`.
impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            match item {
                Item::Text(t) => f.write_str(t)?,
                Item::Slot(_) => f.write_str("?")?,
                Item::Placeholder(p) => write!(f, "{p}")?,
            }
        }
        Ok(())
    }
}

// ==================== Conversions ====================

impl From<Item> for Segment {
    fn from(item: Item) -> Self {
        Segment::Item(item)
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Segment::Item(Item::Text(text.to_string()))
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Segment::Item(Item::Text(text))
    }
}

impl From<Slot> for Segment {
    fn from(slot: Slot) -> Self {
        Segment::Item(Item::Slot(Arc::new(slot)))
    }
}

impl From<Arc<Slot>> for Segment {
    fn from(slot: Arc<Slot>) -> Self {
        Segment::Item(Item::Slot(slot))
    }
}

impl From<Placeholder> for Segment {
    fn from(p: Placeholder) -> Self {
        Segment::Item(Item::Placeholder(p))
    }
}

impl From<Composition> for Segment {
    fn from(c: Composition) -> Self {
        Segment::Composition(c)
    }
}

impl From<&Composition> for Segment {
    fn from(c: &Composition) -> Self {
        Segment::Composition(c.clone())
    }
}

impl From<Segment> for Piece {
    fn from(segment: Segment) -> Self {
        Piece::Segment(segment)
    }
}

impl From<&str> for Piece {
    fn from(text: &str) -> Self {
        Piece::Segment(text.into())
    }
}

impl From<String> for Piece {
    fn from(text: String) -> Self {
        Piece::Segment(text.into())
    }
}

impl From<Slot> for Piece {
    fn from(slot: Slot) -> Self {
        Piece::Segment(slot.into())
    }
}

impl From<Placeholder> for Piece {
    fn from(p: Placeholder) -> Self {
        Piece::Segment(p.into())
    }
}

impl From<Composition> for Piece {
    fn from(c: Composition) -> Self {
        Piece::Segment(c.into())
    }
}

impl From<Value> for Piece {
    fn from(v: Value) -> Self {
        Piece::Value(v)
    }
}
