use super::{Composition, Piece};
use crate::error::QueryResult;

/// A list of sibling fragments, flattened into one [`Composition`] on demand.
///
/// Admission is checked when flattening, so a group may temporarily hold a
/// piece that [`to_composition`](Self::to_composition) will reject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionGroup {
    pieces: Vec<Piece>,
}

impl CompositionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pieces<I, P>(pieces: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Piece>,
    {
        Self {
            pieces: pieces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self, piece: impl Into<Piece>) -> &mut Self {
        self.pieces.push(piece.into());
        self
    }

    /// Insert `separator` between every pair of consecutive elements.
    ///
    /// No-op for groups of zero or one element.
    pub fn space(&mut self, separator: Composition) -> &mut Self {
        if self.pieces.len() < 2 {
            return self;
        }
        let mut spaced = Vec::with_capacity(self.pieces.len() * 2 - 1);
        for (i, piece) in self.pieces.drain(..).enumerate() {
            if i > 0 {
                spaced.push(Piece::from(separator.clone()));
            }
            spaced.push(piece);
        }
        self.pieces = spaced;
        self
    }

    /// Append all elements of `other`.
    pub fn merge(&mut self, other: CompositionGroup) -> &mut Self {
        self.pieces.extend(other.pieces);
        self
    }

    /// Copy of the elements in `start..end`, clamped to the group bounds.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.pieces.len());
        let start = start.min(end);
        Self {
            pieces: self.pieces[start..end].to_vec(),
        }
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Flatten into a single composition, splicing nested compositions.
    pub fn to_composition(&self) -> QueryResult<Composition> {
        Composition::try_from_pieces(self.pieces.iter().cloned())
    }
}
