use std::fmt;

/// A per-vertex attribute buffer that is either fully present or absent.
///
/// A present channel holds exactly one element per mesh vertex; partially
/// filled buffers are not representable as a valid state and are rejected by
/// validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VertexChannel<T> {
    #[default]
    Absent,
    Present(Vec<T>),
}

impl<T> VertexChannel<T> {
    /// Wrap a buffer; an empty buffer means the channel is absent.
    pub fn from_vec(data: Vec<T>) -> Self {
        if data.is_empty() {
            Self::Absent
        } else {
            Self::Present(data)
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Number of stored elements (0 when absent).
    pub fn len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::Present(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            Self::Absent => None,
            Self::Present(data) => Some(data),
        }
    }

    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        match self {
            Self::Absent => None,
            Self::Present(data) => Some(data),
        }
    }

    pub fn get(&self, vertex: usize) -> Option<&T> {
        self.as_slice().and_then(|data| data.get(vertex))
    }

    /// Apply `f` to every element, keeping presence.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> VertexChannel<U> {
        match self {
            Self::Absent => VertexChannel::Absent,
            Self::Present(data) => VertexChannel::Present(data.into_iter().map(f).collect()),
        }
    }

    pub fn into_vec(self) -> Option<Vec<T>> {
        match self {
            Self::Absent => None,
            Self::Present(data) => Some(data),
        }
    }
}

impl<T: Clone> VertexChannel<T> {
    /// Build a new channel by picking elements at `order`, keeping presence.
    pub fn gather(&self, order: &[usize]) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Present(data) => Self::Present(order.iter().map(|&i| data[i].clone()).collect()),
        }
    }
}

/// Identifies one optional vertex channel, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Normals,
    Tangents,
    Bitangents,
    TexCoords(usize),
    Colors(usize),
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Normals => write!(f, "normals"),
            ChannelKind::Tangents => write!(f, "tangents"),
            ChannelKind::Bitangents => write!(f, "bitangents"),
            ChannelKind::TexCoords(n) => write!(f, "texcoords[{n}]"),
            ChannelKind::Colors(n) => write!(f, "colors[{n}]"),
        }
    }
}
