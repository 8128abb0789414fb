// shared.rs — foundational types and geometry shared by all modules
//
// Map space is two dimensional for collision purposes; heights are carried
// separately. Vectors are plain arrays, the same way the rest of the
// workspace passes them around.

// ============================================================
// Basic types
// ============================================================

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];

pub const VEC2_ORIGIN: Vec2 = [0.0, 0.0];
pub const VEC3_ORIGIN: Vec3 = [0.0, 0.0, 0.0];

// ============================================================
// Vector operations
// ============================================================

#[inline]
pub fn dot2(a: &Vec2, b: &Vec2) -> f32 {
    a[0] * b[0] + a[1] * b[1]
}

#[inline]
pub fn vec2_subtract(a: &Vec2, b: &Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub fn vec2_scale(v: &Vec2, scale: f32) -> Vec2 {
    [v[0] * scale, v[1] * scale]
}

pub fn vec2_length(v: &Vec2) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// Normalize in place, returns original length.
pub fn vec2_normalize(v: &mut Vec2) -> f32 {
    let length = vec2_length(v);
    if length != 0.0 {
        let ilength = 1.0 / length;
        v[0] *= ilength;
        v[1] *= ilength;
    }
    length
}

// ============================================================
// Angle functions (radians, counter-clockwise from +x)
// ============================================================

pub fn angle_unit(angle: f32) -> Vec2 {
    [angle.cos(), angle.sin()]
}

// ============================================================
// Bounding boxes
// ============================================================

/// Axis aligned 2D box in map units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl BBox {
    /// An inverted box that any added point will fix up.
    pub fn cleared() -> Self {
        Self {
            top: f32::MIN,
            bottom: f32::MAX,
            left: f32::MAX,
            right: f32::MIN,
        }
    }

    pub fn around(x: f32, y: f32, radius: f32) -> Self {
        Self {
            top: y + radius,
            bottom: y - radius,
            left: x - radius,
            right: x + radius,
        }
    }

    pub fn from_points(a: &Vec2, b: &Vec2) -> Self {
        let mut bbox = Self::cleared();
        bbox.add_point(a);
        bbox.add_point(b);
        bbox
    }

    pub fn add_point(&mut self, p: &Vec2) {
        if p[0] < self.left {
            self.left = p[0];
        }
        if p[0] > self.right {
            self.right = p[0];
        }
        if p[1] < self.bottom {
            self.bottom = p[1];
        }
        if p[1] > self.top {
            self.top = p[1];
        }
    }

    pub fn add_box(&mut self, other: &BBox) {
        self.add_point(&[other.left, other.bottom]);
        self.add_point(&[other.right, other.top]);
    }

    pub fn expand(&self, by: f32) -> Self {
        Self {
            top: self.top + by,
            bottom: self.bottom - by,
            left: self.left - by,
            right: self.right + by,
        }
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &BBox) -> bool {
        !(self.right <= other.left
            || self.left >= other.right
            || self.top <= other.bottom
            || self.bottom >= other.top)
    }

    pub fn mins(&self) -> Vec2 {
        [self.left, self.bottom]
    }

    pub fn maxs(&self) -> Vec2 {
        [self.right, self.top]
    }
}

// ============================================================
// Line side tests
// ============================================================

/// Orientation of a line, used to shortcut box side tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlopeType {
    #[default]
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

impl SlopeType {
    pub fn from_delta(d: &Vec2) -> Self {
        if d[0] == 0.0 {
            SlopeType::Vertical
        } else if d[1] == 0.0 {
            SlopeType::Horizontal
        } else if d[1] / d[0] > 0.0 {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        }
    }
}

/// Returns 0 for the front (right hand) side of `v1 -> v1 + d`, 1 for the
/// back side. Points exactly on the line are on the back side.
pub fn point_on_line_side(p: &Vec2, v1: &Vec2, d: &Vec2) -> usize {
    if d[0] == 0.0 {
        if p[0] <= v1[0] {
            return (d[1] > 0.0) as usize;
        }
        return (d[1] < 0.0) as usize;
    }
    if d[1] == 0.0 {
        if p[1] <= v1[1] {
            return (d[0] < 0.0) as usize;
        }
        return (d[0] > 0.0) as usize;
    }

    let dx = p[0] - v1[0];
    let dy = p[1] - v1[1];
    let left = d[1] * dx;
    let right = dy * d[0];
    if right < left {
        0
    } else {
        1
    }
}

/// Considers the line to be infinite. Returns 0 or 1 when the whole box is on
/// one side, -1 when the box crosses the line.
pub fn box_on_line_side(bbox: &BBox, v1: &Vec2, d: &Vec2, slope: SlopeType) -> i32 {
    let (p1, p2) = match slope {
        SlopeType::Horizontal => {
            let mut p1 = (bbox.top > v1[1]) as usize;
            let mut p2 = (bbox.bottom > v1[1]) as usize;
            if d[0] < 0.0 {
                p1 ^= 1;
                p2 ^= 1;
            }
            (p1, p2)
        }
        SlopeType::Vertical => {
            let mut p1 = (bbox.right < v1[0]) as usize;
            let mut p2 = (bbox.left < v1[0]) as usize;
            if d[1] < 0.0 {
                p1 ^= 1;
                p2 ^= 1;
            }
            (p1, p2)
        }
        SlopeType::Positive => (
            point_on_line_side(&[bbox.left, bbox.top], v1, d),
            point_on_line_side(&[bbox.right, bbox.bottom], v1, d),
        ),
        SlopeType::Negative => (
            point_on_line_side(&[bbox.right, bbox.top], v1, d),
            point_on_line_side(&[bbox.left, bbox.bottom], v1, d),
        ),
    };

    if p1 == p2 {
        p1 as i32
    } else {
        -1
    }
}

// ============================================================
// Divlines: infinite lines used by traces
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DivLine {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

impl DivLine {
    pub fn new(origin: &Vec2, delta: &Vec2) -> Self {
        Self {
            x: origin[0],
            y: origin[1],
            dx: delta[0],
            dy: delta[1],
        }
    }

    pub fn from_points(a: &Vec2, b: &Vec2) -> Self {
        Self::new(a, &vec2_subtract(b, a))
    }
}

pub fn point_on_divline_side(p: &Vec2, line: &DivLine) -> usize {
    point_on_line_side(p, &[line.x, line.y], &[line.dx, line.dy])
}

/// Fractional intercept point along `trace` where it meets `line`.
/// Parallel lines report 0.
pub fn intercept_vector(trace: &DivLine, line: &DivLine) -> f32 {
    let den = line.dy * trace.dx - line.dx * trace.dy;
    if den == 0.0 {
        return 0.0;
    }
    let num = (line.x - trace.x) * line.dy + (trace.y - line.y) * line.dx;
    num / den
}

// ============================================================
// Tests
// ============================================================
