//! Integer areas and byte ranges.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

impl Size<u32> {
    /// The area covering the whole size, anchored at the origin.
    pub fn area(self) -> Area {
        Area::new(0, 0, self.width, self.height)
    }
}

/// An axis-aligned rectangle of texels, `x`/`y` being the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Area {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive maximum x, widened so it cannot overflow.
    pub fn max_x(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive maximum y, widened so it cannot overflow.
    pub fn max_y(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Area) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    pub fn texel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// An inclusive range of byte offsets, `lower..=upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    lower: u64,
    upper: u64,
}

impl ByteRange {
    /// Returns `None` if `lower > upper`.
    pub fn new(lower: u64, upper: u64) -> Option<Self> {
        (lower <= upper).then_some(Self { lower, upper })
    }

    /// The range covering `len` bytes starting at `offset`; `None` for an
    /// empty or overflowing range.
    pub fn from_offset_len(offset: u64, len: u64) -> Option<Self> {
        let last = offset.checked_add(len.checked_sub(1)?)?;
        Self::new(offset, last)
    }

    pub fn lower(&self) -> u64 {
        self.lower
    }

    pub fn upper(&self) -> u64 {
        self.upper
    }

    /// Number of bytes covered.
    pub fn interval(&self) -> u64 {
        self.upper - self.lower + 1
    }

    pub fn includes(&self, value: u64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn includes_range(&self, other: &ByteRange) -> bool {
        other.lower >= self.lower && other.upper <= self.upper
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}
