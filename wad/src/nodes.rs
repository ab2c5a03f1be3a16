//! The spatial-partition tree stored in the NODES lump.

/// Set on a raw child field when the remaining 15 bits index the SSECTORS
/// lump instead of the NODES lump.
pub const IS_SSECTOR_MASK: u16 = 0x8000;

/// A node child reference, tagged by the top bit of the raw 16-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChild {
    /// Further subdivision: index into the NODES array
    Branch(u16),
    /// Terminal leaf: index into the SSECTORS array
    Leaf(u16),
}

impl NodeChild {
    pub fn from_raw(raw: u16) -> Self {
        if raw & IS_SSECTOR_MASK != 0 {
            NodeChild::Leaf(raw & !IS_SSECTOR_MASK)
        } else {
            NodeChild::Branch(raw)
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeChild::Leaf(_))
    }

    pub fn index(&self) -> u16 {
        match self {
            NodeChild::Branch(i) | NodeChild::Leaf(i) => *i,
        }
    }
}

/// The base node structure as parsed from the WAD records. What is stored
/// in the WAD is the splitting line used for dividing the map/node (starts
/// with the map then consecutive nodes, aiming for an even split if
/// possible), a box which encapsulates the right and left regions of the
/// split, and the child references for the two halves.
///
/// **The last node is the root node**
///
/// The data in the WAD lump is structured as follows:
///
/// | Field Size | Data Type | Content                                           |
/// |------------|-----------|---------------------------------------------------|
/// | 0x00-0x01  |    i16    | X coordinate of the splitter                      |
/// | 0x02-0x03  |    i16    | Y coordinate of the splitter                      |
/// | 0x04-0x05  |    i16    | The amount to move in X to reach end of splitter  |
/// | 0x06-0x07  |    i16    | The amount to move in Y to reach end of splitter  |
/// | 0x08-0x0F  |  4 x i16  | Right (front) bounding box: top/bottom/left/right |
/// | 0x10-0x17  |  4 x i16  | Left (back) bounding box: top/bottom/left/right   |
/// | 0x18-0x19  |    u16    | Right child index + sub-sector indicator bit      |
/// | 0x1A-0x1B  |    u16    | Left child index + sub-sector indicator bit       |
///
/// Each record is 28 bytes. Records with a truncated tail are skipped by
/// the decoder rather than failing the whole lump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WadNode {
    /// Where the line used for splitting the map starts
    pub x: i16,
    pub y: i16,
    /// Where the line used for splitting the map ends, relative to start
    pub dx: i16,
    pub dy: i16,
    /// Bounding boxes as [top, bottom, left, right]:
    /// - `[0]` == right box
    /// - `[1]` == left box
    pub bounding_boxes: [[i16; 4]; 2],
    /// The node children, `[right, left]`, each tagged branch or leaf
    pub children: [NodeChild; 2],
}

impl WadNode {
    pub fn new(
        x: i16,
        y: i16,
        dx: i16,
        dy: i16,
        bounding_boxes: [[i16; 4]; 2],
        right_child: u16,
        left_child: u16,
    ) -> Self {
        WadNode {
            x,
            y,
            dx,
            dy,
            bounding_boxes,
            children: [
                NodeChild::from_raw(right_child),
                NodeChild::from_raw(left_child),
            ],
        }
    }
}
