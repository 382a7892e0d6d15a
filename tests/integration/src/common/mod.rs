//! Shared fixtures for the integration scenarios
//!
//! The types below are written the way generated stubs write them, for:
//!
//! ```text
//! typedef enum { SHAPE_CIRCLE = 1, SHAPE_RECT = 2 } SHAPE_KIND;
//!
//! typedef [switch_type(SHAPE_KIND)] union {
//!     [case(SHAPE_CIRCLE)] long radius;
//!     [case(SHAPE_RECT)] struct { short width; short height; hyper area; } rect;
//! } SHAPE;
//!
//! typedef struct {
//!     unsigned long count;
//!     SHAPE_KIND kind;
//!     [switch_is(kind)] SHAPE shape;
//!     [unique, string] wchar_t* label;
//!     [size_is(count)] long points[];
//! } DRAWING;
//!
//! typedef struct { [ptr] long* left; [ptr] long* right; } PAIR;
//! ```

#![allow(dead_code)]

use std::sync::Once;

use ndr::{
    Align, ConformantArray, Decoder, Encoder, FullPtr, Marshal, NdrError, NdrWString, ReadBuffer, Result,
    TransferSyntax, Unmarshal, WriteBuffer,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

static TRACING: Once = Once::new();

/// Install a warn-level test subscriber once per process
pub fn init_tracing() {
    TRACING.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::WARN)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapeKind {
    #[default]
    Circle = 1,
    Rect = 2,
}

impl TryFrom<i32> for ShapeKind {
    type Error = NdrError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(ShapeKind::Circle),
            2 => Ok(ShapeKind::Rect),
            other => Err(NdrError::InvalidEnum(i64::from(other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Circle { radius: i32 },
    Rect { width: i16, height: i16, area: i64 },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Circle { radius: 0 }
    }
}

impl Shape {
    /// Largest arm is the rect with its hyper
    const ALIGN: Align = Align::fixed(8);

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rect { .. } => ShapeKind::Rect,
        }
    }

    /// Write the arm; the discriminant belongs to the enclosing structure
    pub fn marshal_arm<B: WriteBuffer, S: TransferSyntax>(&self, w: &mut Encoder<'_, B, S>) -> Result<()> {
        w.write_union_align(Self::ALIGN)?;
        match *self {
            Shape::Circle { radius } => w.write_data(radius),
            Shape::Rect { width, height, area } => {
                w.write_align(Self::ALIGN)?;
                w.write_data(width)?;
                w.write_data(height)?;
                w.write_data(area)
            }
        }
    }

    pub fn unmarshal_arm<B: ReadBuffer, S: TransferSyntax>(
        &mut self,
        kind: ShapeKind,
        r: &mut Decoder<'_, B, S>,
    ) -> Result<()> {
        r.read_union_align(Self::ALIGN)?;
        *self = match kind {
            ShapeKind::Circle => Shape::Circle { radius: r.read_data()? },
            ShapeKind::Rect => {
                r.read_align(Self::ALIGN)?;
                Shape::Rect {
                    width: r.read_data()?,
                    height: r.read_data()?,
                    area: r.read_data()?,
                }
            }
        };
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drawing {
    pub shape: Shape,
    pub label: Option<NdrWString>,
    pub points: ConformantArray<i32>,
}

impl Drawing {
    const ALIGN: Align = Align::fixed(8);

    pub fn sample() -> Self {
        Self {
            shape: Shape::Circle { radius: 5 },
            label: Some(NdrWString::new("ab")),
            points: ConformantArray::new(vec![1, 2]),
        }
    }
}

impl Marshal for Drawing {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_size(self.points.len())?;
        w.write_align(Self::ALIGN)?;
        let count = u32::try_from(self.points.len()).map_err(|_| NdrError::IntegerOverflow)?;
        w.write_data(count)?;
        w.write_enum(self.shape.kind() as i32)?;
        self.shape.marshal_arm(w)?;
        w.write_pointer(self.label.as_ref())?;
        self.points.marshal_elements(w)?;
        w.write_trailing_gap(Self::ALIGN)
    }
}

impl Unmarshal for Drawing {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        let size = r.read_size()?;
        r.read_align(Self::ALIGN)?;
        let count: u32 = r.read_data()?;
        if count as usize != size {
            return Err(NdrError::ConformanceMismatch {
                max_count: size as u64,
                offset: 0,
                actual_count: u64::from(count),
            });
        }
        let kind = ShapeKind::try_from(r.read_enum()?)?;
        self.shape.unmarshal_arm(kind, r)?;
        r.read_pointer(&mut self.label)?;
        self.points.unmarshal_elements(r, size)?;
        r.read_trailing_gap(Self::ALIGN)
    }
}

#[derive(Debug, Default)]
pub struct Pair {
    pub left: FullPtr<i32>,
    pub right: FullPtr<i32>,
}

impl Pair {
    /// Both pointers at one referent
    pub fn aliased(value: i32) -> Self {
        let shared = FullPtr::new(value);
        Self {
            left: shared.alias(),
            right: shared,
        }
    }
}

impl Marshal for Pair {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_align(Align::POINTER)?;
        self.left.marshal(w)?;
        self.right.marshal(w)
    }
}

impl Unmarshal for Pair {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        r.read_align(Align::POINTER)?;
        self.left.unmarshal(r)?;
        self.right.unmarshal(r)
    }
}

/// Classic NDR bytes of `Drawing::sample()`
pub const DRAWING_NDR: [u8; 50] = [
    2, 0, 0, 0, // conformance of points
    0, 0, 0, 0, // align 8
    2, 0, 0, 0, // count
    1, 0, // kind
    0, 0, // align 4
    5, 0, 0, 0, // radius
    21, 0, 0, 0, // label referent id
    1, 0, 0, 0, 2, 0, 0, 0, // points
    3, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, // label header
    b'a', 0, b'b', 0, 0, 0,
];

/// Classic NDR bytes of `Pair::aliased(42)`
pub const PAIR_NDR: [u8; 12] = [1, 0, 0, 0, 1, 0, 0, 0, 42, 0, 0, 0];
